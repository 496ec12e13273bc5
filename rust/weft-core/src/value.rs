//! Tagged value representation for the weft engine.

use crate::error::EngineError;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Runtime values produced and consumed by the expression engine.
///
/// Every value carries exactly one of nine kinds. Non-integer numerics always
/// live in the `Decimal` domain — host floats are converted on construction,
/// so no `f64` ever reaches equality or ordering. Objects keep their entries
/// in insertion order; `Display` and object traversal depend on that.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    String(String),
    Guid(Uuid),
    Date(DateTime<FixedOffset>),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// The observable kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Decimal,
    String,
    Guid,
    Date,
    Array,
    Object,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Decimal => "decimal",
            ValueKind::String => "string",
            ValueKind::Guid => "guid",
            ValueKind::Date => "date",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::String(_) => ValueKind::String,
            Value::Guid(_) => ValueKind::Guid,
            Value::Date(_) => ValueKind::Date,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // -- Constructors --

    /// Build a value from a string, trying the numeric and boolean readings
    /// first: a `.`-containing string that parses as decimal becomes
    /// `Decimal`, then integer, then boolean, otherwise the string itself.
    pub fn parse_str(s: &str) -> Value {
        if s.contains('.') {
            if let Ok(d) = Decimal::from_str(s) {
                return Value::Decimal(d);
            }
        }
        if let Ok(n) = s.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(b) = s.parse::<bool>() {
            return Value::Bool(b);
        }
        Value::String(s.to_string())
    }

    /// Convert a host float into the decimal domain.
    ///
    /// Fails for values the decimal type cannot represent (NaN, infinities,
    /// magnitudes beyond its range).
    pub fn from_f64(f: f64) -> Result<Value, EngineError> {
        Decimal::from_f64(f)
            .map(Value::Decimal)
            .ok_or_else(|| EngineError::TypeMismatch {
                expected: "a decimal-representable number".to_string(),
                found: format!("float {f}"),
            })
    }

    // -- Typed views --
    //
    // Each accessor fails with `TypeMismatch` when the value is of a
    // different kind; the numeric pair (`as_int`/`as_decimal`) cross-casts
    // between `Int` and `Decimal`.

    pub fn as_bool(&self) -> Result<bool, EngineError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(EngineError::type_mismatch("a boolean", other)),
        }
    }

    pub fn as_int(&self) -> Result<i64, EngineError> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Decimal(d) => d.trunc().to_i64().ok_or_else(|| EngineError::TypeMismatch {
                expected: "an integer-ranged number".to_string(),
                found: format!("decimal {d}"),
            }),
            other => Err(EngineError::type_mismatch("an integer", other)),
        }
    }

    pub fn as_decimal(&self) -> Result<Decimal, EngineError> {
        match self {
            Value::Decimal(d) => Ok(*d),
            Value::Int(n) => Ok(Decimal::from(*n)),
            other => Err(EngineError::type_mismatch("a number", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, EngineError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(EngineError::type_mismatch("a string", other)),
        }
    }

    pub fn as_guid(&self) -> Result<Uuid, EngineError> {
        match self {
            Value::Guid(g) => Ok(*g),
            other => Err(EngineError::type_mismatch("a guid", other)),
        }
    }

    pub fn as_date(&self) -> Result<DateTime<FixedOffset>, EngineError> {
        match self {
            Value::Date(d) => Ok(*d),
            other => Err(EngineError::type_mismatch("a date", other)),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], EngineError> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(EngineError::type_mismatch("an array", other)),
        }
    }

    pub fn as_object(&self) -> Result<&IndexMap<String, Value>, EngineError> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(EngineError::type_mismatch("an object", other)),
        }
    }

    // -- Indexing --

    /// Positional lookup on an array.
    pub fn index(&self, index: i64) -> Result<&Value, EngineError> {
        let items = self.as_array()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .ok_or(EngineError::IndexOutOfRange {
                index,
                len: items.len(),
            })
    }

    /// Read through a slash-separated key path (`"a/b/c"`).
    ///
    /// Fails with `KeyMissing` as soon as a segment is absent and with
    /// `TypeMismatch` when the path descends into a non-object.
    pub fn get_path(&self, path: &str) -> Result<&Value, EngineError> {
        let mut current = self;
        let mut walked = false;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            walked = true;
            current = current
                .as_object()?
                .get(segment)
                .ok_or_else(|| EngineError::KeyMissing(segment.to_string()))?;
        }
        if walked {
            Ok(current)
        } else {
            Err(EngineError::KeyMissing(path.to_string()))
        }
    }

    /// Write through a slash-separated key path, creating empty objects for
    /// missing intermediate segments and replacing the final leaf. An
    /// intermediate that exists but is not an object is replaced by one.
    pub fn set_path(&mut self, path: &str, value: Value) -> Result<(), EngineError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, intermediate)) = segments.split_last() else {
            return Err(EngineError::KeyMissing(path.to_string()));
        };
        let mut current = match self {
            Value::Object(map) => map,
            other => return Err(EngineError::type_mismatch("an object", other)),
        };
        for segment in intermediate {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(IndexMap::new()));
            if !matches!(entry, Value::Object(_)) {
                *entry = Value::Object(IndexMap::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("just replaced with an object"),
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }

    /// Whether the full slash-separated path resolves on this value.
    /// Returns `false` when the value is not an object.
    pub fn contains_path(&self, path: &str) -> bool {
        let mut current = self;
        let mut walked = false;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            walked = true;
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(next) => current = next,
                    None => return false,
                },
                _ => return false,
            }
        }
        walked && matches!(self, Value::Object(_))
    }

    // -- Ordering --

    /// Total ordering over comparable pairs: booleans, numerics (via decimal
    /// promotion), strings, guids and dates compare by their natural order;
    /// arrays and objects compare by size. Any other pairing signals
    /// `TypeMismatch`.
    pub fn compare(&self, other: &Value) -> Result<Ordering, EngineError> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Int(_) | Value::Decimal(_), Value::Int(_) | Value::Decimal(_)) => {
                Ok(self.as_decimal()?.cmp(&other.as_decimal()?))
            }
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            (Value::Guid(a), Value::Guid(b)) => Ok(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            (Value::Array(a), Value::Array(b)) => Ok(a.len().cmp(&b.len())),
            (Value::Object(a), Value::Object(b)) => Ok(a.len().cmp(&b.len())),
            _ => Err(EngineError::TypeMismatch {
                expected: format!("a value comparable to {}", self.kind()),
                found: other.kind().name().to_string(),
            }),
        }
    }
}

// -- Structural equality --
//
// Arrays compare element-wise in order; objects compare as unordered
// (key, value) sets of equal size; Int and Decimal compare numerically
// across kinds. All other pairings require matching kinds.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Int(a), Value::Decimal(b)) => Decimal::from(*a) == *b,
            (Value::Decimal(a), Value::Int(b)) => *a == Decimal::from(*b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Guid(a), Value::Guid(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, va)| b.get(k).is_some_and(|vb| va == vb))
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(d: DateTime<FixedOffset>) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

// -- Stringification --
//
// The form used for diagnostics and for splicing results into interpolated
// strings: scalars in their natural text, arrays as `[a, b]`, objects as
// `{k=v,k2=v2}`, null as `<null>`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("<null>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Decimal(d) => write!(f, "{}", d.normalize()),
            Value::String(s) => f.write_str(s),
            Value::Guid(g) => write!(f, "{g}"),
            Value::Date(d) => f.write_str(&d.to_rfc3339()),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Object(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", parts.join(","))
            }
        }
    }
}

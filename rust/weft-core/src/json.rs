//! JSON tree import and export for the value model.
//!
//! Import walks a [`serde_json::Value`] tree and produces engine values,
//! fanning out concurrently over object members and array elements. When a
//! [`TemplateEngine`] is supplied, string leaves that contain a template
//! expression are re-parsed through it — this is how templates embedded in
//! ingested payloads get evaluated (normalisation). Export covers the
//! JSON-representable subset; guids and dates serialise as their string
//! forms.

use crate::error::EngineError;
use crate::value::Value;
use crate::TemplateEngine;
use futures::future::{try_join_all, BoxFuture};
use indexmap::IndexMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Whether a string leaf holds a template expression and must go through
/// the engine during normalisation.
fn holds_expression(s: &str) -> bool {
    s.starts_with('@') || s.contains("@{")
}

/// Convert a JSON tree into a [`Value`].
///
/// An empty JSON array becomes `Null`; floats and out-of-range integers land
/// in the decimal domain. With an engine reference, string leaves holding
/// expressions are evaluated; without one they pass through verbatim.
pub fn from_json_tree<'a>(
    node: &'a serde_json::Value,
    engine: Option<&'a dyn TemplateEngine>,
) -> BoxFuture<'a, Result<Value, EngineError>> {
    Box::pin(async move {
        match node {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => convert_number(n),
            serde_json::Value::String(s) => match engine {
                Some(engine) if holds_expression(s) => engine.parse_to_value(s).await,
                _ => Ok(Value::String(s.clone())),
            },
            serde_json::Value::Array(items) => {
                if items.is_empty() {
                    return Ok(Value::Null);
                }
                let elements =
                    try_join_all(items.iter().map(|item| from_json_tree(item, engine))).await?;
                Ok(Value::Array(elements))
            }
            serde_json::Value::Object(map) => {
                let members =
                    try_join_all(map.values().map(|member| from_json_tree(member, engine)))
                        .await?;
                Ok(Value::Object(
                    map.keys().cloned().zip(members).collect::<IndexMap<_, _>>(),
                ))
            }
        }
    })
}

/// Re-parse every expression-holding string leaf of an already-built value
/// through the engine, recursing through arrays and objects.
///
/// This is the constructor path for objects assembled by user code; the
/// evaluator builds its objects directly and never calls it, which is what
/// keeps normalisation from looping on its own output.
pub fn normalize<'a>(
    value: Value,
    engine: &'a dyn TemplateEngine,
) -> BoxFuture<'a, Result<Value, EngineError>> {
    Box::pin(async move {
        match value {
            Value::String(s) if holds_expression(&s) => engine.parse_to_value(&s).await,
            Value::Array(items) => {
                let elements =
                    try_join_all(items.into_iter().map(|item| normalize(item, engine))).await?;
                Ok(Value::Array(elements))
            }
            Value::Object(map) => {
                let (keys, members): (Vec<_>, Vec<_>) = map.into_iter().unzip();
                let members =
                    try_join_all(members.into_iter().map(|member| normalize(member, engine)))
                        .await?;
                Ok(Value::Object(keys.into_iter().zip(members).collect()))
            }
            other => Ok(other),
        }
    })
}

/// Convert a [`Value`] into a JSON tree.
pub fn to_json_tree(value: &Value) -> Result<serde_json::Value, EngineError> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(n) => Ok(serde_json::Value::Number((*n).into())),
        Value::Decimal(d) => d
            .to_f64()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .ok_or_else(|| EngineError::UnsupportedJsonType(format!("decimal {d}"))),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Guid(g) => Ok(serde_json::Value::String(g.to_string())),
        Value::Date(d) => Ok(serde_json::Value::String(d.to_rfc3339())),
        Value::Array(items) => Ok(serde_json::Value::Array(
            items.iter().map(to_json_tree).collect::<Result<_, _>>()?,
        )),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, member) in map {
                out.insert(key.clone(), to_json_tree(member)?);
            }
            Ok(serde_json::Value::Object(out))
        }
    }
}

fn convert_number(n: &serde_json::Number) -> Result<Value, EngineError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Int(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::Decimal(Decimal::from(u)));
    }
    n.as_f64()
        .and_then(Decimal::from_f64)
        .map(Value::Decimal)
        .ok_or_else(|| EngineError::UnsupportedJsonType(format!("number {n}")))
}

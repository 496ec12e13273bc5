//! Array and object built-ins.

use crate::{expect_at_least, take1, take2, take3};
use indexmap::IndexMap;
use weft_core::{EngineError, Value};
use weft_engine::Engine;

pub fn register(engine: &mut Engine) {
    engine.register_function("createArray", create_array);
    engine.register_function("createObject", create_object);
    engine.register_function("first", first);
    engine.register_function("last", last);
    engine.register_function("union", union);
    engine.register_function("empty", empty);
    engine.register_function("contains", contains);
    engine.register_function("skip", skip);
    engine.register_function("take", take);
    engine.register_function("join", join);
    engine.register_function("setProperty", set_property);
    engine.register_function("addProperty", add_property);
}

async fn create_array(args: Vec<Value>) -> Result<Value, EngineError> {
    Ok(Value::Array(args))
}

/// Build an object from alternating key/value arguments.
async fn create_object(args: Vec<Value>) -> Result<Value, EngineError> {
    if args.len() % 2 != 0 {
        return Err(EngineError::argument(
            "createObject",
            "expected alternating key/value arguments",
        ));
    }
    let mut map = IndexMap::with_capacity(args.len() / 2);
    let mut iter = args.into_iter();
    while let (Some(key), Some(member)) = (iter.next(), iter.next()) {
        map.insert(key.as_str()?.to_string(), member);
    }
    Ok(Value::Object(map))
}

async fn first(args: Vec<Value>) -> Result<Value, EngineError> {
    match take1("first", args)? {
        Value::Array(items) => Ok(items.into_iter().next().unwrap_or(Value::Null)),
        Value::String(s) => Ok(s
            .chars()
            .next()
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null)),
        other => Err(EngineError::type_mismatch("an array or string", &other)),
    }
}

async fn last(args: Vec<Value>) -> Result<Value, EngineError> {
    match take1("last", args)? {
        Value::Array(mut items) => Ok(items.pop().unwrap_or(Value::Null)),
        Value::String(s) => Ok(s
            .chars()
            .last()
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null)),
        other => Err(EngineError::type_mismatch("an array or string", &other)),
    }
}

/// Union of arrays (first-seen order, deduplicated by structural equality)
/// or of objects (later keys overwrite earlier ones). All arguments must
/// share the kind of the first.
async fn union(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_at_least("union", &args, 2)?;
    match &args[0] {
        Value::Array(_) => {
            let mut merged: Vec<Value> = Vec::new();
            for arg in &args {
                for item in arg.as_array()? {
                    if !merged.contains(item) {
                        merged.push(item.clone());
                    }
                }
            }
            Ok(Value::Array(merged))
        }
        Value::Object(_) => {
            let mut merged = IndexMap::new();
            for arg in &args {
                for (key, member) in arg.as_object()? {
                    merged.insert(key.clone(), member.clone());
                }
            }
            Ok(Value::Object(merged))
        }
        other => Err(EngineError::type_mismatch("an array or object", other)),
    }
}

/// True iff the value is null, an empty string, an empty array or an empty
/// object.
async fn empty(args: Vec<Value>) -> Result<Value, EngineError> {
    match take1("empty", args)? {
        Value::Null => Ok(Value::Bool(true)),
        Value::String(s) => Ok(Value::Bool(s.is_empty())),
        Value::Array(items) => Ok(Value::Bool(items.is_empty())),
        Value::Object(map) => Ok(Value::Bool(map.is_empty())),
        other => Err(EngineError::type_mismatch(
            "a null, string, array or object value",
            &other,
        )),
    }
}

/// Substring test on strings, structural membership on arrays, key-path
/// presence on objects.
async fn contains(args: Vec<Value>) -> Result<Value, EngineError> {
    let (collection, needle) = take2("contains", args)?;
    match (&collection, &needle) {
        (Value::String(text), Value::String(sub)) => Ok(Value::Bool(text.contains(sub))),
        (Value::String(_), other) => Err(EngineError::type_mismatch("a substring", other)),
        (Value::Array(items), _) => Ok(Value::Bool(items.contains(&needle))),
        (Value::Object(_), Value::String(path)) => Ok(Value::Bool(collection.contains_path(path))),
        (Value::Object(_), other) => Err(EngineError::type_mismatch("a string key", other)),
        (other, _) => Err(EngineError::type_mismatch(
            "a string, array or object",
            other,
        )),
    }
}

async fn skip(args: Vec<Value>) -> Result<Value, EngineError> {
    let (collection, count) = take2("skip", args)?;
    let count = non_negative("skip", &count)?;
    let items = collection.as_array()?;
    Ok(Value::Array(
        items.iter().skip(count).cloned().collect::<Vec<_>>(),
    ))
}

async fn take(args: Vec<Value>) -> Result<Value, EngineError> {
    let (collection, count) = take2("take", args)?;
    let count = non_negative("take", &count)?;
    let items = collection.as_array()?;
    Ok(Value::Array(
        items.iter().take(count).cloned().collect::<Vec<_>>(),
    ))
}

async fn join(args: Vec<Value>) -> Result<Value, EngineError> {
    let (collection, separator) = take2("join", args)?;
    let parts: Vec<String> = collection
        .as_array()?
        .iter()
        .map(|item| item.to_string())
        .collect();
    Ok(Value::String(parts.join(separator.as_str()?)))
}

/// Replace (or create) the member at a slash-separated path, returning the
/// updated object.
async fn set_property(args: Vec<Value>) -> Result<Value, EngineError> {
    let (mut target, path, member) = take3("setProperty", args)?;
    let path = path.as_str()?.to_string();
    target.set_path(&path, member)?;
    Ok(target)
}

/// As `setProperty`, but refuses to overwrite an existing member.
async fn add_property(args: Vec<Value>) -> Result<Value, EngineError> {
    let (mut target, path, member) = take3("addProperty", args)?;
    let path = path.as_str()?.to_string();
    if target.contains_path(&path) {
        return Err(EngineError::argument(
            "addProperty",
            format!("property '{path}' already exists"),
        ));
    }
    target.set_path(&path, member)?;
    Ok(target)
}

fn non_negative(function: &str, count: &Value) -> Result<usize, EngineError> {
    usize::try_from(count.as_int()?)
        .map_err(|_| EngineError::argument(function, "count must not be negative"))
}

//! String built-ins.

use crate::{expect_at_least, expect_between, take1, take2, take3};
use weft_core::{EngineError, Value};
use weft_engine::Engine;

pub fn register(engine: &mut Engine) {
    engine.register_function("concat", concat);
    engine.register_function("toUpper", to_upper);
    engine.register_function("toLower", to_lower);
    engine.register_function("trim", trim);
    engine.register_function("replace", replace);
    engine.register_function("split", split);
    engine.register_function("substring", substring);
    engine.register_function("indexOf", index_of);
    engine.register_function("startsWith", starts_with);
    engine.register_function("endsWith", ends_with);
    engine.register_function("length", length);
    engine.register_function("string", stringify);
}

/// Stringify and append every argument in order.
async fn concat(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_at_least("concat", &args, 1)?;
    let mut joined = String::new();
    for arg in &args {
        joined.push_str(&arg.to_string());
    }
    Ok(Value::String(joined))
}

async fn to_upper(args: Vec<Value>) -> Result<Value, EngineError> {
    let s = take1("toUpper", args)?;
    Ok(Value::String(s.as_str()?.to_uppercase()))
}

async fn to_lower(args: Vec<Value>) -> Result<Value, EngineError> {
    let s = take1("toLower", args)?;
    Ok(Value::String(s.as_str()?.to_lowercase()))
}

async fn trim(args: Vec<Value>) -> Result<Value, EngineError> {
    let s = take1("trim", args)?;
    Ok(Value::String(s.as_str()?.trim().to_string()))
}

async fn replace(args: Vec<Value>) -> Result<Value, EngineError> {
    let (text, from, to) = take3("replace", args)?;
    let from = from.as_str()?;
    if from.is_empty() {
        return Err(EngineError::argument(
            "replace",
            "the string to replace must not be empty",
        ));
    }
    Ok(Value::String(text.as_str()?.replace(from, to.as_str()?)))
}

async fn split(args: Vec<Value>) -> Result<Value, EngineError> {
    let (text, separator) = take2("split", args)?;
    let separator = separator.as_str()?;
    if separator.is_empty() {
        return Err(EngineError::argument(
            "split",
            "the separator must not be empty",
        ));
    }
    Ok(Value::Array(
        text.as_str()?
            .split(separator)
            .map(Value::from)
            .collect::<Vec<_>>(),
    ))
}

/// Character-based substring with an optional length.
async fn substring(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_between("substring", &args, 2, 3)?;
    let mut iter = args.into_iter();
    let text = iter.next().unwrap_or(Value::Null);
    let start = iter.next().unwrap_or(Value::Null);
    let chars: Vec<char> = text.as_str()?.chars().collect();
    let start = usize::try_from(start.as_int()?)
        .map_err(|_| EngineError::argument("substring", "start index must not be negative"))?;
    if start > chars.len() {
        return Err(EngineError::argument(
            "substring",
            "start index is past the end of the string",
        ));
    }
    let length = match iter.next() {
        Some(length) => usize::try_from(length.as_int()?)
            .map_err(|_| EngineError::argument("substring", "length must not be negative"))?,
        None => chars.len() - start,
    };
    if start + length > chars.len() {
        return Err(EngineError::argument(
            "substring",
            "requested range is past the end of the string",
        ));
    }
    Ok(Value::String(chars[start..start + length].iter().collect()))
}

/// Character index of the first occurrence, or -1.
async fn index_of(args: Vec<Value>) -> Result<Value, EngineError> {
    let (text, needle) = take2("indexOf", args)?;
    let text = text.as_str()?;
    let index = match text.find(needle.as_str()?) {
        Some(byte_index) => text[..byte_index].chars().count() as i64,
        None => -1,
    };
    Ok(Value::Int(index))
}

async fn starts_with(args: Vec<Value>) -> Result<Value, EngineError> {
    let (text, prefix) = take2("startsWith", args)?;
    Ok(Value::Bool(text.as_str()?.starts_with(prefix.as_str()?)))
}

async fn ends_with(args: Vec<Value>) -> Result<Value, EngineError> {
    let (text, suffix) = take2("endsWith", args)?;
    Ok(Value::Bool(text.as_str()?.ends_with(suffix.as_str()?)))
}

/// Character count of a string or element count of an array.
async fn length(args: Vec<Value>) -> Result<Value, EngineError> {
    match take1("length", args)? {
        Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::Array(items) => Ok(Value::Int(items.len() as i64)),
        other => Err(EngineError::type_mismatch("a string or array", &other)),
    }
}

async fn stringify(args: Vec<Value>) -> Result<Value, EngineError> {
    let value = take1("string", args)?;
    Ok(Value::String(value.to_string()))
}

//! Built-in function catalogue for the weft engine.
//!
//! The engine itself ships with an empty registry; this crate provides the
//! workflow built-ins, one module per family, and [`register_all`] to wire
//! the whole catalogue onto an [`Engine`]. Handlers follow the registry
//! contract: they validate their own arity and argument kinds and are pure
//! except for the explicitly clock- and randomness-backed ones (`utcNow`,
//! `guid`).

pub mod collections;
pub mod conversion;
pub mod datetime;
pub mod guid;
pub mod logical;
pub mod strings;

use weft_core::{EngineError, Value};
use weft_engine::Engine;

/// Register the full catalogue on an engine.
pub fn register_all(engine: &mut Engine) {
    strings::register(engine);
    collections::register(engine);
    logical::register(engine);
    conversion::register(engine);
    datetime::register(engine);
    guid::register(engine);
}

// -- Shared argument plumbing --

pub(crate) fn expect_arity(
    function: &str,
    args: &[Value],
    expected: usize,
) -> Result<(), EngineError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EngineError::argument(
            function,
            format!("expected {expected} argument(s), got {}", args.len()),
        ))
    }
}

pub(crate) fn expect_at_least(
    function: &str,
    args: &[Value],
    min: usize,
) -> Result<(), EngineError> {
    if args.len() >= min {
        Ok(())
    } else {
        Err(EngineError::argument(
            function,
            format!("expected at least {min} argument(s), got {}", args.len()),
        ))
    }
}

pub(crate) fn expect_between(
    function: &str,
    args: &[Value],
    min: usize,
    max: usize,
) -> Result<(), EngineError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(EngineError::argument(
            function,
            format!(
                "expected between {min} and {max} argument(s), got {}",
                args.len()
            ),
        ))
    }
}

pub(crate) fn take1(function: &str, args: Vec<Value>) -> Result<Value, EngineError> {
    expect_arity(function, &args, 1)?;
    Ok(args.into_iter().next().unwrap_or(Value::Null))
}

pub(crate) fn take2(function: &str, args: Vec<Value>) -> Result<(Value, Value), EngineError> {
    expect_arity(function, &args, 2)?;
    let mut iter = args.into_iter();
    Ok((
        iter.next().unwrap_or(Value::Null),
        iter.next().unwrap_or(Value::Null),
    ))
}

pub(crate) fn take3(
    function: &str,
    args: Vec<Value>,
) -> Result<(Value, Value, Value), EngineError> {
    expect_arity(function, &args, 3)?;
    let mut iter = args.into_iter();
    Ok((
        iter.next().unwrap_or(Value::Null),
        iter.next().unwrap_or(Value::Null),
        iter.next().unwrap_or(Value::Null),
    ))
}

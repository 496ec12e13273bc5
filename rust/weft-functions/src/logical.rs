//! Comparison and boolean built-ins.

use crate::{expect_at_least, take1, take2, take3};
use weft_core::{EngineError, Value};
use weft_engine::Engine;

pub fn register(engine: &mut Engine) {
    engine.register_function("equals", equals);
    engine.register_function("not", not);
    engine.register_function("and", and);
    engine.register_function("or", or);
    engine.register_function("if", if_then_else);
    engine.register_function("greater", greater);
    engine.register_function("greaterOrEquals", greater_or_equals);
    engine.register_function("less", less);
    engine.register_function("lessOrEquals", less_or_equals);
    engine.register_function("coalesce", coalesce);
}

/// Structural equality, with integers and decimals comparing numerically.
async fn equals(args: Vec<Value>) -> Result<Value, EngineError> {
    let (a, b) = take2("equals", args)?;
    Ok(Value::Bool(a == b))
}

async fn not(args: Vec<Value>) -> Result<Value, EngineError> {
    let value = take1("not", args)?;
    Ok(Value::Bool(!value.as_bool()?))
}

async fn and(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_at_least("and", &args, 2)?;
    for arg in &args {
        if !arg.as_bool()? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

async fn or(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_at_least("or", &args, 2)?;
    for arg in &args {
        if arg.as_bool()? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

/// Select between two already-evaluated branches.
async fn if_then_else(args: Vec<Value>) -> Result<Value, EngineError> {
    let (condition, when_true, when_false) = take3("if", args)?;
    Ok(if condition.as_bool()? {
        when_true
    } else {
        when_false
    })
}

async fn greater(args: Vec<Value>) -> Result<Value, EngineError> {
    let (a, b) = take2("greater", args)?;
    Ok(Value::Bool(a.compare(&b)?.is_gt()))
}

async fn greater_or_equals(args: Vec<Value>) -> Result<Value, EngineError> {
    let (a, b) = take2("greaterOrEquals", args)?;
    Ok(Value::Bool(a.compare(&b)?.is_ge()))
}

async fn less(args: Vec<Value>) -> Result<Value, EngineError> {
    let (a, b) = take2("less", args)?;
    Ok(Value::Bool(a.compare(&b)?.is_lt()))
}

async fn less_or_equals(args: Vec<Value>) -> Result<Value, EngineError> {
    let (a, b) = take2("lessOrEquals", args)?;
    Ok(Value::Bool(a.compare(&b)?.is_le()))
}

/// First non-null argument, or null when every argument is null.
async fn coalesce(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_at_least("coalesce", &args, 1)?;
    Ok(args
        .into_iter()
        .find(|arg| !arg.is_null())
        .unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_equals_spans_numeric_kinds() {
        assert_eq!(
            equals(vec![Value::Int(2), Value::Decimal(Decimal::from(2))])
                .await
                .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            equals(vec![Value::from("a"), Value::from("b")])
                .await
                .unwrap(),
            Value::Bool(false)
        );
    }

    #[tokio::test]
    async fn test_boolean_folds() {
        assert_eq!(
            and(vec![Value::Bool(true), Value::Bool(false)])
                .await
                .unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            or(vec![Value::Bool(false), Value::Bool(true)])
                .await
                .unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            and(vec![Value::Bool(true), Value::Int(1)]).await,
            Err(EngineError::TypeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_if_selects_branch() {
        assert_eq!(
            if_then_else(vec![Value::Bool(true), Value::Int(1), Value::Int(2)])
                .await
                .unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            if_then_else(vec![Value::Bool(false), Value::Int(1), Value::Int(2)])
                .await
                .unwrap(),
            Value::Int(2)
        );
    }

    #[tokio::test]
    async fn test_orderings() {
        assert_eq!(
            greater(vec![Value::Int(3), Value::Decimal(Decimal::from(2))])
                .await
                .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            less_or_equals(vec![Value::from("a"), Value::from("a")])
                .await
                .unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            greater(vec![Value::Int(1), Value::from("x")]).await,
            Err(EngineError::TypeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_coalesce_picks_first_non_null() {
        assert_eq!(
            coalesce(vec![Value::Null, Value::Int(5), Value::Int(6)])
                .await
                .unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            coalesce(vec![Value::Null, Value::Null]).await.unwrap(),
            Value::Null
        );
    }
}

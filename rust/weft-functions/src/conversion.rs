//! Kind-conversion built-ins.

use crate::take1;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use weft_core::{json, EngineError, Value};
use weft_engine::Engine;

pub fn register(engine: &mut Engine) {
    engine.register_function("int", int);
    engine.register_function("decimal", decimal);
    engine.register_function("bool", bool_);
    engine.register_function("json", json_);
}

async fn int(args: Vec<Value>) -> Result<Value, EngineError> {
    match take1("int", args)? {
        value @ Value::Int(_) => Ok(value),
        Value::Decimal(d) => d.trunc().to_i64().map(Value::Int).ok_or_else(|| {
            EngineError::argument("int", format!("decimal {d} is out of integer range"))
        }),
        Value::String(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            EngineError::argument("int", format!("cannot convert '{s}' to an integer"))
        }),
        other => Err(EngineError::type_mismatch(
            "a number or numeric string",
            &other,
        )),
    }
}

async fn decimal(args: Vec<Value>) -> Result<Value, EngineError> {
    match take1("decimal", args)? {
        value @ Value::Decimal(_) => Ok(value),
        Value::Int(n) => Ok(Value::Decimal(Decimal::from(n))),
        Value::String(s) => Decimal::from_str(s.trim()).map(Value::Decimal).map_err(|_| {
            EngineError::argument("decimal", format!("cannot convert '{s}' to a decimal"))
        }),
        other => Err(EngineError::type_mismatch(
            "a number or numeric string",
            &other,
        )),
    }
}

async fn bool_(args: Vec<Value>) -> Result<Value, EngineError> {
    match take1("bool", args)? {
        value @ Value::Bool(_) => Ok(value),
        Value::Int(n) => Ok(Value::Bool(n != 0)),
        Value::String(s) => s.parse::<bool>().map(Value::Bool).map_err(|_| {
            EngineError::argument("bool", format!("cannot convert '{s}' to a boolean"))
        }),
        other => Err(EngineError::type_mismatch(
            "a boolean, integer or boolean string",
            &other,
        )),
    }
}

/// Parse a JSON document into a value tree.
async fn json_(args: Vec<Value>) -> Result<Value, EngineError> {
    let text = take1("json", args)?;
    let tree: serde_json::Value = serde_json::from_str(text.as_str()?)
        .map_err(|e| EngineError::argument("json", e.to_string()))?;
    json::from_json_tree(&tree, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_int_conversions() {
        assert_eq!(int(vec![Value::Int(4)]).await.unwrap(), Value::Int(4));
        assert_eq!(
            int(vec![Value::Decimal(Decimal::from_str("4.9").unwrap())])
                .await
                .unwrap(),
            Value::Int(4)
        );
        assert_eq!(int(vec![Value::from(" 12 ")]).await.unwrap(), Value::Int(12));
        assert!(matches!(
            int(vec![Value::from("four")]).await,
            Err(EngineError::Argument { .. })
        ));
        assert!(matches!(
            int(vec![Value::Bool(true)]).await,
            Err(EngineError::TypeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_decimal_conversions() {
        assert_eq!(
            decimal(vec![Value::Int(3)]).await.unwrap(),
            Value::Decimal(Decimal::from(3))
        );
        assert_eq!(
            decimal(vec![Value::from("2.5")]).await.unwrap(),
            Value::Decimal(Decimal::from_str("2.5").unwrap())
        );
    }

    #[tokio::test]
    async fn test_bool_conversions() {
        assert_eq!(
            bool_(vec![Value::from("true")]).await.unwrap(),
            Value::Bool(true)
        );
        assert_eq!(bool_(vec![Value::Int(0)]).await.unwrap(), Value::Bool(false));
        assert_eq!(bool_(vec![Value::Int(7)]).await.unwrap(), Value::Bool(true));
    }

    #[tokio::test]
    async fn test_json_parses_into_value_tree() {
        let parsed = json_(vec![Value::from(r#"{"a": [1, 2], "b": "x"}"#)])
            .await
            .unwrap();
        assert_eq!(
            parsed.get_path("a").unwrap(),
            &Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(parsed.get_path("b").unwrap(), &Value::from("x"));
        assert!(matches!(
            json_(vec![Value::from("not json")]).await,
            Err(EngineError::Argument { .. })
        ));
    }
}

//! JSON ingestion through a live engine: template normalisation and the
//! guarantees around it.

use serde_json::json;
use weft_core::json::{from_json_tree, normalize, to_json_tree};
use weft_engine::{Engine, Value};

fn engine() -> Engine {
    let mut engine = Engine::new();
    weft_functions::register_all(&mut engine);
    engine
}

#[tokio::test]
async fn test_expression_leaves_are_evaluated() {
    let engine = engine();
    let tree = json!({
        "greeting": "@concat('hello ', 'world')",
        "plain": "text",
        "mixed": "pre@{toUpper('x')}post",
        "nested": {"inner": "@first(createArray(9))"},
        "list": ["@empty('')", "keep"]
    });
    let value = from_json_tree(&tree, Some(&engine)).await.unwrap();
    assert_eq!(value.get_path("greeting").unwrap(), &Value::from("hello world"));
    assert_eq!(value.get_path("plain").unwrap(), &Value::from("text"));
    assert_eq!(value.get_path("mixed").unwrap(), &Value::from("preXpost"));
    assert_eq!(value.get_path("nested/inner").unwrap(), &Value::Int(9));
    assert_eq!(
        value.get_path("list").unwrap(),
        &Value::Array(vec![Value::Bool(true), Value::from("keep")])
    );
}

#[tokio::test]
async fn test_evaluator_results_are_not_renormalised() {
    // A handler may legitimately return text that looks like an expression;
    // the evaluator must hand it back verbatim instead of looping it through
    // the parser again.
    let mut engine = engine();
    engine.register_function("raw", |_args| async move {
        Ok(Value::from("@concat('should stay raw')"))
    });
    assert_eq!(
        engine.evaluate_to_value("@raw()").await.unwrap(),
        Value::from("@concat('should stay raw')")
    );

    let tree = json!({"leaf": "@raw()"});
    let value = from_json_tree(&tree, Some(&engine)).await.unwrap();
    assert_eq!(
        value.get_path("leaf").unwrap(),
        &Value::from("@concat('should stay raw')")
    );
}

#[tokio::test]
async fn test_normalize_user_built_values() {
    let engine = engine();
    let raw = from_json_tree(&json!({"a": "@toUpper('abc')", "b": "plain"}), None)
        .await
        .unwrap();
    assert_eq!(raw.get_path("a").unwrap(), &Value::from("@toUpper('abc')"));

    let normalised = normalize(raw, &engine).await.unwrap();
    assert_eq!(normalised.get_path("a").unwrap(), &Value::from("ABC"));
    assert_eq!(normalised.get_path("b").unwrap(), &Value::from("plain"));
}

#[tokio::test]
async fn test_scalar_conversions_during_ingest() {
    let value = from_json_tree(&json!({"i": 3, "f": 2.5, "none": null, "gone": []}), None)
        .await
        .unwrap();
    assert_eq!(value.get_path("i").unwrap(), &Value::Int(3));
    assert_eq!(
        value.get_path("f").unwrap(),
        &Value::Decimal("2.5".parse().unwrap())
    );
    assert_eq!(value.get_path("none").unwrap(), &Value::Null);
    assert_eq!(value.get_path("gone").unwrap(), &Value::Null);
}

#[tokio::test]
async fn test_ingest_export_round_trip() {
    let tree = json!({
        "flag": false,
        "count": 7,
        "items": [1, 2, "three"],
        "meta": {"name": "weft", "ratio": 0.5}
    });
    let value = from_json_tree(&tree, None).await.unwrap();
    assert_eq!(to_json_tree(&value).unwrap(), tree);
}

#[tokio::test]
async fn test_errors_inside_leaves_surface_at_ingest() {
    let engine = engine();
    let tree = json!({"bad": "@nosuch()"});
    let err = from_json_tree(&tree, Some(&engine)).await.unwrap_err();
    assert_eq!(
        err,
        weft_engine::EngineError::UnknownFunction("nosuch".to_string())
    );
}

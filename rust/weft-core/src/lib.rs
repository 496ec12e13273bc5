//! Core value model for the weft expression engine.
//!
//! Defines the tagged [`Value`] runtime type shared by the parser, the
//! evaluator and the function catalogue, plus the error taxonomy surfaced at
//! the engine boundary and the JSON tree import/export used to move values in
//! and out of host payloads.

pub mod error;
pub mod json;
pub mod value;

pub use error::EngineError;
pub use value::{Value, ValueKind};

use async_trait::async_trait;

/// Evaluation hook consumed by JSON ingestion.
///
/// String leaves of an ingested tree may themselves contain template
/// expressions; when an implementation of this trait is supplied, those
/// leaves are re-parsed through it (see [`json::from_json_tree`]). The
/// engine crate provides the canonical implementation; this trait only
/// exists so the value model does not depend on the evaluator.
#[async_trait]
pub trait TemplateEngine: Send + Sync {
    async fn parse_to_value(&self, input: &str) -> Result<Value, EngineError>;
}

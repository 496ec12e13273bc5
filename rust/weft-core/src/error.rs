//! Error taxonomy surfaced at the engine boundary.

use crate::value::Value;
use thiserror::Error;

/// Errors produced while parsing or evaluating a template expression.
///
/// Every failure inside the engine — the parser, the rule evaluator, the
/// value model and the registered function handlers — is reported through
/// this enum. There is no in-language error handling; callers decide what
/// a failed evaluation means.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("parse error at line {line}, col {col}: {message}")]
    Parse {
        message: String,
        line: usize,
        col: usize,
    },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("invalid argument to {function}: {reason}")]
    Argument { function: String, reason: String },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("key '{0}' not found")]
    KeyMissing(String),
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("unsupported JSON value: {0}")]
    UnsupportedJsonType(String),
    #[error("evaluation was cancelled")]
    Cancelled,
}

impl EngineError {
    /// A `TypeMismatch` naming the kind of the offending value.
    pub fn type_mismatch(expected: impl Into<String>, found: &Value) -> Self {
        EngineError::TypeMismatch {
            expected: expected.into(),
            found: found.kind().name().to_string(),
        }
    }

    /// An `Argument` error attributed to the named function.
    pub fn argument(function: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Argument {
            function: function.into(),
            reason: reason.into(),
        }
    }
}

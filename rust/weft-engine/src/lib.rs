//! weft-engine
//!
//! Parses and evaluates workflow template expressions such as
//! `@concat('hello ', toUpper('world'))` or `prefix@{func(arg)}suffix`.
//! The engine owns a registry of named async function handlers and an
//! ordered list of textual macros; both are populated at construction time,
//! after which evaluation only needs `&self` and may run concurrently from
//! any number of callers.
//!
//! ```no_run
//! # async fn demo() -> Result<(), weft_core::EngineError> {
//! use weft_core::Value;
//! use weft_engine::Engine;
//!
//! let mut engine = Engine::new();
//! engine.register_function("greet", |_args| async move {
//!     Ok(Value::from("hello"))
//! });
//! assert_eq!(engine.evaluate_to_string("@greet()").await?, "hello");
//! # Ok(())
//! # }
//! ```

pub mod parser;
pub mod rules;

pub use parser::ParseError;
pub use rules::{Rule, Segment, Template};
pub use weft_core::{EngineError, Value, ValueKind};

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use weft_core::TemplateEngine;

/// A registered function: takes the evaluated argument vector, returns a
/// value asynchronously. Handlers do their own arity and kind checking.
pub type FunctionHandler =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, EngineError>> + Send + Sync>;

/// The expression engine: function registry, macro list and evaluation
/// entry points.
#[derive(Default)]
pub struct Engine {
    functions: HashMap<String, FunctionHandler>,
    macros: Vec<(String, String)>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            macros: Vec::new(),
        }
    }

    /// Register a named function. Names are case-sensitive; registering the
    /// same name again replaces the earlier handler.
    pub fn register_function<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, EngineError>> + Send + 'static,
    {
        self.functions
            .insert(name.into(), Arc::new(move |args| Box::pin(handler(args))));
    }

    /// Register a textual macro. Macros are applied to the raw input in
    /// registration order, before parsing.
    pub fn register_macro(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.macros.push((from.into(), to.into()));
    }

    pub(crate) fn function(&self, name: &str) -> Result<&FunctionHandler, EngineError> {
        self.functions
            .get(name)
            .ok_or_else(|| EngineError::UnknownFunction(name.to_string()))
    }

    fn expand_macros(&self, input: &str) -> String {
        let mut expanded = input.to_string();
        for (from, to) in &self.macros {
            if expanded.contains(from.as_str()) {
                log::debug!("expanding macro '{from}'");
                expanded = expanded.replace(from.as_str(), to);
            }
        }
        expanded
    }

    /// Parse and evaluate, returning the raw result.
    pub async fn evaluate_to_value(&self, input: &str) -> Result<Value, EngineError> {
        let expanded = self.expand_macros(input);
        match parser::parse(&expanded)? {
            Template::Expression(rule) => rule.evaluate(self, None).await,
            Template::JoinedString(segments) => {
                let mut joined = String::new();
                for segment in &segments {
                    match segment {
                        Segment::Literal(text) => joined.push_str(text),
                        Segment::Expression(rule) => {
                            match rule.evaluate(self, None).await? {
                                Value::String(s) => joined.push_str(&s),
                                other => joined.push_str(&other.to_string()),
                            }
                        }
                    }
                }
                Ok(Value::String(joined))
            }
        }
    }

    /// Parse and evaluate, then stringify: a string result returns its inner
    /// text, every other kind uses the value's display form.
    pub async fn evaluate_to_string(&self, input: &str) -> Result<String, EngineError> {
        match self.evaluate_to_value(input).await? {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    /// Alias used by the JSON normalisation pipeline.
    pub async fn parse_to_value(&self, input: &str) -> Result<Value, EngineError> {
        self.evaluate_to_value(input).await
    }
}

#[async_trait]
impl TemplateEngine for Engine {
    async fn parse_to_value(&self, input: &str) -> Result<Value, EngineError> {
        self.evaluate_to_value(input).await
    }
}

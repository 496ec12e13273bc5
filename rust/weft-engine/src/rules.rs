//! Rule tree produced by the parser and interpreted by the evaluator.

use crate::Engine;
use futures::future::BoxFuture;
use weft_core::{EngineError, Value};

/// A parsed template input: either a bare `@…` expression covering the whole
/// input, or a joined string whose segments are spliced together.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    Expression(Rule),
    JoinedString(Vec<Segment>),
}

/// One piece of a joined string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    /// An `@{…}` enclosed expression whose result is stringified in place.
    Expression(Rule),
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Folded literal: `true`, `false`, an integer or a decimal.
    Constant(Value),
    /// Single-quoted literal with `''` unescaped to `'`.
    StringLiteral(Value),
    /// Named function invocation.
    Call { name: String, args: Vec<Rule> },
    /// Bracket `[k]` or dot `.name` accessor applied to the contextual
    /// value; `nullable` corresponds to a leading `?`.
    Index { inner: Box<Rule>, nullable: bool },
    /// Evaluate `base`, then evaluate `accessor` with the result as the
    /// contextual value.
    Access { base: Box<Rule>, accessor: Box<Rule> },
}

impl Rule {
    pub(crate) fn access(base: Rule, accessor: Rule) -> Rule {
        Rule::Access {
            base: Box::new(base),
            accessor: Box::new(accessor),
        }
    }

    /// Interpret this rule against the engine. `context` carries the value an
    /// accessor reads into; only `Access` nodes set it.
    pub(crate) fn evaluate<'a>(
        &'a self,
        engine: &'a Engine,
        context: Option<&'a Value>,
    ) -> BoxFuture<'a, Result<Value, EngineError>> {
        Box::pin(async move {
            match self {
                Rule::Constant(value) | Rule::StringLiteral(value) => Ok(value.clone()),
                Rule::Call { name, args } => {
                    let handler = engine.function(name)?;
                    let mut values = Vec::with_capacity(args.len());
                    for arg in args {
                        values.push(arg.evaluate(engine, None).await?);
                    }
                    log::trace!("dispatching {name}({} args)", values.len());
                    handler(values).await
                }
                Rule::Access { base, accessor } => {
                    let value = base.evaluate(engine, context).await?;
                    accessor.evaluate(engine, Some(&value)).await
                }
                Rule::Index { inner, nullable } => {
                    let Some(value) = context else {
                        return Err(EngineError::TypeMismatch {
                            expected: "a value to index into".to_string(),
                            found: "nothing".to_string(),
                        });
                    };
                    if value.is_null() && *nullable {
                        return Ok(Value::Null);
                    }
                    match inner.evaluate(engine, None).await? {
                        Value::String(key) => match value {
                            Value::Object(map) => match map.get(&key) {
                                Some(member) => Ok(member.clone()),
                                None if *nullable => Ok(Value::Null),
                                None => Err(EngineError::KeyMissing(key)),
                            },
                            other => Err(EngineError::type_mismatch("an object", other)),
                        },
                        Value::Int(index) => Ok(value.index(index)?.clone()),
                        other => Err(EngineError::type_mismatch(
                            "a string key or integer index",
                            &other,
                        )),
                    }
                }
            }
        })
    }
}

//! Entry descriptor: where a child module is fetched from.

use crate::entry::resolver::ResolveError;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::fmt::{Debug, Display, Formatter};
use std::future::Future;
use std::rc::Rc;

/// Zero-argument async producer of a module address.
pub type EntryProducer = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<String, String>>>;

/// Literal module address, or a deferred producer of one.
///
/// Consumed once per mount attempt.
#[derive(Clone)]
pub enum EntryDescriptor {
    Literal(String),
    Producer(EntryProducer),
}

impl EntryDescriptor {
    pub fn literal(address: impl Into<String>) -> Self {
        Self::Literal(address.into())
    }

    /// Wraps an async producer; its error is kept as the display string.
    pub fn producer<F, Fut, E>(produce: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<String, E>> + 'static,
        E: Display,
    {
        Self::Producer(Rc::new(move || {
            produce()
                .map(|result| result.map_err(|err| err.to_string()))
                .boxed_local()
        }))
    }

    /// Reads a descriptor from configuration data.
    ///
    /// Only JSON strings are addresses; any other shape is a type mismatch.
    pub fn from_value(value: &Value) -> Result<Self, ResolveError> {
        match value {
            Value::String(address) => Ok(Self::Literal(address.clone())),
            other => Err(ResolveError::EntryTypeMismatch(json_kind(other))),
        }
    }

    /// Address of a literal entry; `None` for producers.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(address) => Some(address),
            Self::Producer(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Producer(_) => "producer",
        }
    }
}

impl Debug for EntryDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(address) => f.debug_tuple("Literal").field(address).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<&str> for EntryDescriptor {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<String> for EntryDescriptor {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use serde_json::{Map, Value};
use std::sync::Arc;
use crate::errors::Result;

/// Keyword arguments, in insertion order of the JSON map.
pub type Kwargs = Map<String, Value>;

/// Arguments for a single operation invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub keywords: Kwargs,
}

impl Arguments {
    pub fn new() -> Self { Self::default() }

    pub fn from_keywords(keywords: Kwargs) -> Self {
        Self { positional: Vec::new(), keywords }
    }

    pub fn with_positional(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keywords.insert(name.into(), value);
        self
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }
}

/// The one capability the group needs from the objects it dispatches to.
///
/// `name` is the handle's identity inside a group and must be unique there.
/// `invoke` is expected to fail, usually with
/// [`GroupError::OperationNotFound`](crate::errors::GroupError::OperationNotFound),
/// when `operation` is unknown.
pub trait Handle {
    fn name(&self) -> &str;
    fn supports(&self, operation: &str) -> bool;
    fn invoke(&self, operation: &str, args: &Arguments) -> Result<Value>;
}

impl<T: Handle + ?Sized> Handle for &T {
    fn name(&self) -> &str { (**self).name() }
    fn supports(&self, operation: &str) -> bool { (**self).supports(operation) }
    fn invoke(&self, operation: &str, args: &Arguments) -> Result<Value> {
        (**self).invoke(operation, args)
    }
}

impl<T: Handle + ?Sized> Handle for Box<T> {
    fn name(&self) -> &str { (**self).name() }
    fn supports(&self, operation: &str) -> bool { (**self).supports(operation) }
    fn invoke(&self, operation: &str, args: &Arguments) -> Result<Value> {
        (**self).invoke(operation, args)
    }
}

impl<T: Handle + ?Sized> Handle for Arc<T> {
    fn name(&self) -> &str { (**self).name() }
    fn supports(&self, operation: &str) -> bool { (**self).supports(operation) }
    fn invoke(&self, operation: &str, args: &Arguments) -> Result<Value> {
        (**self).invoke(operation, args)
    }
}

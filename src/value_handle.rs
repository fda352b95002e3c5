use serde_json::Value;
use crate::errors::{GroupError, Result};
use crate::handle::{Arguments, Handle};
use crate::operations::Registry;

/// Handle over a JSON value whose operations come from a [`Registry`].
#[derive(Debug, Clone)]
pub struct ValueHandle {
    name: String,
    state: Value,
    registry: Registry,
}

impl ValueHandle {
    pub fn new(name: impl Into<String>, state: Value, registry: Registry) -> Self {
        Self { name: name.into(), state, registry }
    }

    pub fn state(&self) -> &Value { &self.state }

    pub fn registry(&self) -> &Registry { &self.registry }
}

impl Handle for ValueHandle {
    fn name(&self) -> &str { &self.name }

    fn supports(&self, operation: &str) -> bool {
        self.registry.contains(operation)
    }

    fn invoke(&self, operation: &str, args: &Arguments) -> Result<Value> {
        let op = self.registry.get(operation).ok_or_else(|| GroupError::OperationNotFound {
            handle: self.name.clone(),
            operation: operation.to_string(),
        })?;
        if !op.arity().contains(&args.positional.len()) {
            return Err(GroupError::delegate(
                &self.name,
                format!(
                    "`{operation}` takes {:?} positional arguments, got {}",
                    op.arity(),
                    args.positional.len()
                ),
            ));
        }
        op.call(&self.state, args)
            .map_err(|message| GroupError::delegate(&self.name, message))
    }
}

use serde_json::Value;
use std::collections::BTreeMap;
use crate::errors::{GroupError, Result};
use crate::handle::Kwargs;

/// Per-handle argument overrides.
///
/// Every stored sequence holds exactly one value per handle, so the value
/// for handle `i` is always `sequence[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    handles: usize,
    params: BTreeMap<String, Vec<Value>>,
}

impl Context {
    /// Empty context for a group of `handles` handles.
    pub fn new(handles: usize) -> Self {
        Self { handles, params: BTreeMap::new() }
    }

    pub fn handles(&self) -> usize { self.handles }

    pub fn len(&self) -> usize { self.params.len() }

    pub fn is_empty(&self) -> bool { self.params.is_empty() }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// Register one sequence per parameter name.
    ///
    /// Only arrays of exactly `handles` elements are accepted. Strings and
    /// every other scalar are rejected rather than broadcast. All entries are
    /// checked before any is stored: on error the table is left untouched.
    pub fn apply<I, K>(&mut self, parameters: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut staged = Vec::new();
        for (name, value) in parameters {
            let name = name.into();
            let values = self.check(&name, value)?;
            staged.push((name, values));
        }
        for (name, values) in staged {
            tracing::debug!(parameter = %name, "context value applied");
            self.params.insert(name, values);
        }
        Ok(self)
    }

    fn check(&self, name: &str, value: Value) -> Result<Vec<Value>> {
        match value {
            Value::Array(items) if items.len() == self.handles => Ok(items),
            Value::Array(items) => Err(GroupError::invalid_context(
                name,
                format!("expected {} values, got {}", self.handles, items.len()),
            )),
            Value::String(_) => Err(GroupError::invalid_context(
                name,
                "text is a scalar, not a per-handle sequence",
            )),
            other => Err(GroupError::invalid_context(
                name,
                format!("expected a sequence of {} values, got {}", self.handles, kind(&other)),
            )),
        }
    }

    /// Keyword overrides for the handle at `index`. Out of range yields none.
    pub fn resolve(&self, index: usize) -> Kwargs {
        self.params
            .iter()
            .filter_map(|(name, values)| values.get(index).map(|v| (name.clone(), v.clone())))
            .collect()
    }

    pub fn clear(&mut self) {
        if !self.params.is_empty() {
            tracing::debug!(entries = self.params.len(), "context cleared");
        }
        self.params.clear();
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

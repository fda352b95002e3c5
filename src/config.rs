use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::errors::{GroupError, Result};
use crate::group::InstanceGroup;
use crate::operations::Registry;
use crate::value_handle::ValueHandle;

/// Serializable description of a group of [`ValueHandle`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub handles: Vec<HandleConfig>,
    /// Per-handle values applied right after construction.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleConfig {
    /// Defaults to `h<index>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Value,
}

impl GroupConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| GroupError::Config(format!("invalid group config: {e}")))
    }

    /// Build the group with the builtin registry and apply `context`.
    pub fn build(&self) -> Result<InstanceGroup<ValueHandle>> {
        self.build_with(Registry::with_builtins())
    }

    pub fn build_with(&self, registry: Registry) -> Result<InstanceGroup<ValueHandle>> {
        let handles = self.handles.iter().enumerate().map(|(i, h)| {
            let name = h.name.clone().unwrap_or_else(|| format!("h{i}"));
            ValueHandle::new(name, h.value.clone(), registry.clone())
        });
        let mut group = InstanceGroup::new(handles)?;
        group.apply(self.context.clone())?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn default_names_and_context() {
        let cfg = GroupConfig::from_json(
            r#"{"handles":[{"value":1},{"name":"named","value":2}],"context":{"factor":[5,6]}}"#,
        )
        .unwrap();
        let group = cfg.build().unwrap();
        let states: Vec<_> = group.iter().map(|h| h.state().clone()).collect();
        assert_eq!(states, vec![json!(1), json!(2)]);
        assert_eq!(group.position_by_name("h0").unwrap(), 0);
        assert_eq!(group.position_by_name("named").unwrap(), 1);
        assert_eq!(group.context().values("factor"), Some(&[json!(5), json!(6)][..]));
    }

    #[test]
    fn bad_json() {
        assert!(matches!(GroupConfig::from_json("{"), Err(GroupError::Config(_))));
    }

    #[test]
    fn bad_context_fails_build() {
        let cfg = GroupConfig::from_json(r#"{"handles":[{"value":1}],"context":{"f":"x"}}"#).unwrap();
        assert!(matches!(cfg.build(), Err(GroupError::InvalidContextValue { .. })));
    }
}

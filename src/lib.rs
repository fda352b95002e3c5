//! Fan-out dispatch over a fixed, ordered group of handles.
//!
//! An [`InstanceGroup`] invokes one operation on every handle it holds and
//! returns the results in handle order. Per-handle argument overrides are
//! registered with [`InstanceGroup::apply`] and live until the enclosing
//! [`Scope`] ends, or can be passed explicitly as a [`Context`].

pub mod errors;
pub mod handle;
pub mod context;
pub mod group;
pub mod scope;
pub mod operations; // builtin operations for ValueHandle
pub mod value_handle;
pub mod config;
pub mod parser;

pub use config::{GroupConfig, HandleConfig};
pub use context::Context;
pub use errors::{GroupError, Result};
pub use group::InstanceGroup;
pub use handle::{Arguments, Handle, Kwargs};
pub use operations::{Operation, Registry};
pub use scope::Scope;
pub use value_handle::ValueHandle;

/// Build a group from a JSON config and run `operation` by name on it.
pub fn execute_config(config: &str, operation: &str, common: &Kwargs) -> Result<Vec<serde_json::Value>> {
    let mut group = GroupConfig::from_json(config)?.build()?;
    group.scoped(|g| g.execute(operation, common))
}

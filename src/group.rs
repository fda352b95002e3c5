use serde_json::Value;
use std::collections::HashMap;
use crate::context::Context;
use crate::errors::{GroupError, Result};
use crate::handle::{Arguments, Handle, Kwargs};

/// Fixed, ordered set of handles plus the override table shared by every
/// dispatch until the enclosing scope ends.
#[derive(Debug)]
pub struct InstanceGroup<H> {
    handles: Vec<H>,
    positions: HashMap<String, usize>,
    context: Context,
}

impl<H: Handle> InstanceGroup<H> {
    /// Build a group; order is kept and names must be unique.
    pub fn new<I>(handles: I) -> Result<Self>
    where
        I: IntoIterator<Item = H>,
    {
        let handles: Vec<H> = handles.into_iter().collect();
        if handles.is_empty() {
            return Err(GroupError::EmptyGroup);
        }
        let mut positions = HashMap::with_capacity(handles.len());
        for (i, handle) in handles.iter().enumerate() {
            if positions.insert(handle.name().to_string(), i).is_some() {
                return Err(GroupError::DuplicateHandle { handle: handle.name().to_string() });
            }
        }
        let context = Context::new(handles.len());
        Ok(Self { handles, positions, context })
    }

    pub fn position_of(&self, handle: &H) -> Result<usize> {
        self.position_by_name(handle.name())
    }

    pub fn position_by_name(&self, name: &str) -> Result<usize> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| GroupError::NotAMember { handle: name.to_string() })
    }

    /// Register per-handle values; see [`Context::apply`].
    pub fn apply<I, K>(&mut self, parameters: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.context.apply(parameters)?;
        Ok(self)
    }

    /// Fresh, empty context sized for this group, for the `*_with` calls.
    pub fn new_context(&self) -> Context {
        Context::new(self.handles.len())
    }

    /// Invoke `operation` on every handle through its own `invoke`.
    ///
    /// Context values win over keyword arguments of the same name. Unknown
    /// operations fail however the handle decides to fail.
    pub fn call(&self, operation: &str, args: &Arguments) -> Result<Vec<Value>> {
        self.call_with(&self.context, operation, args)
    }

    pub fn call_with(&self, context: &Context, operation: &str, args: &Arguments) -> Result<Vec<Value>> {
        self.check_context(context)?;
        tracing::debug!(operation, handles = self.handles.len(), "implicit dispatch");
        let mut results = Vec::with_capacity(self.handles.len());
        for handle in &self.handles {
            let index = self.position_of(handle)?;
            let per_handle = Arguments {
                positional: args.positional.clone(),
                keywords: merge(args.keywords.clone(), &context.resolve(index)),
            };
            trace_invoke(handle, &per_handle.keywords);
            results.push(handle.invoke(operation, &per_handle)?);
        }
        Ok(results)
    }

    /// Run `f` once per handle with only that handle's context overrides.
    pub fn lambda<F, R>(&self, f: F) -> Result<Vec<R>>
    where
        F: FnMut(&H, Kwargs) -> Result<R>,
    {
        self.lambda_with(&self.context, f)
    }

    pub fn lambda_with<F, R>(&self, context: &Context, mut f: F) -> Result<Vec<R>>
    where
        F: FnMut(&H, Kwargs) -> Result<R>,
    {
        self.check_context(context)?;
        tracing::debug!(handles = self.handles.len(), "callable dispatch");
        self.handles
            .iter()
            .enumerate()
            .map(|(i, handle)| {
                let keywords = context.resolve(i);
                trace_invoke(handle, &keywords);
                f(handle, keywords)
            })
            .collect()
    }

    /// Invoke `operation` on every handle, context first, `common` on top.
    ///
    /// Stops at the first handle that does not support `operation`; handles
    /// already invoked keep whatever effects they had.
    pub fn execute(&self, operation: &str, common: &Kwargs) -> Result<Vec<Value>> {
        self.execute_with(&self.context, operation, common)
    }

    pub fn execute_with(&self, context: &Context, operation: &str, common: &Kwargs) -> Result<Vec<Value>> {
        self.check_context(context)?;
        tracing::debug!(operation, handles = self.handles.len(), "named dispatch");
        let mut results = Vec::with_capacity(self.handles.len());
        for (i, handle) in self.handles.iter().enumerate() {
            if !handle.supports(operation) {
                return Err(GroupError::OperationNotFound {
                    handle: handle.name().to_string(),
                    operation: operation.to_string(),
                });
            }
            let args = Arguments::from_keywords(merge(context.resolve(i), common));
            trace_invoke(handle, &args.keywords);
            results.push(handle.invoke(operation, &args)?);
        }
        Ok(results)
    }

    fn check_context(&self, context: &Context) -> Result<()> {
        if context.handles() != self.handles.len() {
            return Err(GroupError::invalid_context(
                "context",
                format!(
                    "sized for {} handles, group has {}",
                    context.handles(),
                    self.handles.len()
                ),
            ));
        }
        Ok(())
    }
}

impl<H> InstanceGroup<H> {
    pub fn len(&self) -> usize { self.handles.len() }

    /// Always false for a constructed group.
    pub fn is_empty(&self) -> bool { self.handles.is_empty() }

    pub fn handles(&self) -> &[H] { &self.handles }

    pub fn get(&self, index: usize) -> Option<&H> { self.handles.get(index) }

    pub fn iter(&self) -> std::slice::Iter<'_, H> { self.handles.iter() }

    pub fn context(&self) -> &Context { &self.context }

    pub(crate) fn clear_context(&mut self) {
        self.context.clear();
    }
}

impl<'a, H> IntoIterator for &'a InstanceGroup<H> {
    type Item = &'a H;
    type IntoIter = std::slice::Iter<'a, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

/// `base` extended by `top`; `top` wins on collision.
fn merge(mut base: Kwargs, top: &Kwargs) -> Kwargs {
    for (name, value) in top {
        base.insert(name.clone(), value.clone());
    }
    base
}

fn trace_invoke<H: Handle>(handle: &H, keywords: &Kwargs) {
    tracing::trace!(
        handle = handle.name(),
        keywords = ?keywords.keys().collect::<Vec<_>>(),
        "invoking"
    );
}

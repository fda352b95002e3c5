use std::ops::{Deref, DerefMut};
use crate::group::InstanceGroup;

/// Borrow of a group whose context is wiped when the borrow ends,
/// on every exit path including early returns and panics.
pub struct Scope<'a, H> {
    group: &'a mut InstanceGroup<H>,
}

impl<H> InstanceGroup<H> {
    /// Enter a scope. Nothing is set up; the group is handed back as is.
    pub fn scope(&mut self) -> Scope<'_, H> {
        Scope { group: self }
    }

    /// Run `body` inside a scope and return its result untouched.
    pub fn scoped<F, R>(&mut self, body: F) -> R
    where
        F: FnOnce(&mut InstanceGroup<H>) -> R,
    {
        let mut scope = self.scope();
        body(&mut scope)
    }
}

impl<H> Deref for Scope<'_, H> {
    type Target = InstanceGroup<H>;

    fn deref(&self) -> &Self::Target {
        self.group
    }
}

impl<H> DerefMut for Scope<'_, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.group
    }
}

impl<H> Drop for Scope<'_, H> {
    fn drop(&mut self) {
        self.group.clear_context();
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::GroupError;
    use crate::handle::Kwargs;
    use crate::operations::Registry;
    use crate::value_handle::ValueHandle;
    use crate::InstanceGroup;
    use serde_json::json;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn pair() -> InstanceGroup<ValueHandle> {
        let registry = Registry::with_builtins();
        InstanceGroup::new(vec![
            ValueHandle::new("a", json!(1), registry.clone()),
            ValueHandle::new("b", json!(2), registry),
        ])
        .unwrap()
    }

    #[test]
    fn guard_clears_on_drop() {
        let mut group = pair();
        {
            let scope = group.apply([("factor", json!([2, 3]))]).unwrap().scope();
            assert_eq!(scope.context().len(), 1);
        }
        assert!(group.context().is_empty());
    }

    #[test]
    fn scoped_returns_error_and_still_clears() {
        let mut group = pair();
        let out = group.scoped(|g| {
            g.apply([("factor", json!([2, 3]))])?;
            g.execute("missing", &Kwargs::new())
        });
        assert!(matches!(out, Err(GroupError::OperationNotFound { .. })));
        assert!(group.context().is_empty());
    }

    #[test]
    fn panic_inside_scope_still_clears() {
        let mut group = pair();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut scope = group.scope();
            scope.apply([("factor", json!([2, 3]))]).unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(group.context().is_empty());
    }
}

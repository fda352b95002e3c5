use instance_group as ig;
use ig::{Arguments, GroupError, InstanceGroup, Kwargs, Registry, ValueHandle};
use pretty_assertions::assert_eq;
use serde_json::json;

fn group_of(values: &[i64]) -> InstanceGroup<ValueHandle> {
    let registry = Registry::with_builtins();
    InstanceGroup::new(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ValueHandle::new(format!("h{i}"), json!(v), registry.clone())),
    )
    .unwrap()
}

#[test]
fn test_scope_exit_clears_after_failure() {
    let mut group = group_of(&[1, 2]);
    let failed = group.scoped(|g| {
        g.apply([("by", json!([1, 1]))])?;
        g.execute("no_such_op", &Kwargs::new())
    });
    assert!(matches!(failed, Err(GroupError::OperationNotFound { .. })));

    // No apply since the scope ended: `offset` gets no `by` and fails in the handle.
    let err = group.execute("offset", &Kwargs::new()).unwrap_err();
    assert!(matches!(err, GroupError::Delegate { ref handle, .. } if handle == "h0"));
}

#[test]
fn test_context_survives_several_dispatches_in_one_scope() {
    let mut group = group_of(&[1, 2]);
    let mut scope = group.scope();
    scope.apply([("by", json!([100, 200]))]).unwrap();
    let first = scope.execute("offset", &Kwargs::new()).unwrap();
    let second = scope.call("offset", &Arguments::new()).unwrap();
    assert_eq!(first, vec![json!(101), json!(202)]);
    assert_eq!(first, second);
    drop(scope);
    assert!(group.context().is_empty());
}

#[test]
fn test_wrong_length_is_not_registered() {
    let mut group = group_of(&[1, 2, 3]);
    let err = group.apply([("factor", json!([1, 2]))]).unwrap_err();
    assert_eq!(
        err,
        GroupError::InvalidContextValue {
            parameter: "factor".into(),
            reason: "expected 3 values, got 2".into(),
        }
    );
    assert!(group.context().values("factor").is_none());
}

#[test]
fn test_scalars_are_never_broadcast() {
    let mut group = group_of(&[1, 2]);
    for value in [json!(2), json!("ab"), json!(null), json!(true), json!({"x": [1, 2]})] {
        let err = group.apply([("factor", value)]).unwrap_err();
        assert!(matches!(err, GroupError::InvalidContextValue { ref parameter, .. } if parameter == "factor"));
    }
    assert!(group.context().is_empty());
}

#[test]
fn test_apply_is_atomic() {
    let mut group = group_of(&[1, 2]);
    let err = group
        .apply([("by", json!([1, 2])), ("factor", json!("xy"))])
        .unwrap_err();
    assert!(matches!(err, GroupError::InvalidContextValue { ref parameter, .. } if parameter == "factor"));
    assert!(group.context().is_empty());
}

#[test]
fn test_explicit_context_leaves_group_context_alone() {
    let mut group = group_of(&[1, 2]);
    group.apply([("by", json!([5, 5]))]).unwrap();
    let mut ctx = group.new_context();
    ctx.apply([("by", json!([-1, -2]))]).unwrap();
    let out = group.execute_with(&ctx, "offset", &Kwargs::new()).unwrap();
    assert_eq!(out, vec![json!(0), json!(0)]);
    assert_eq!(group.context().values("by"), Some(&[json!(5), json!(5)][..]));
}

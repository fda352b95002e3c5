use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use crate::handle::Arguments;

/// Outcome of one operation; the message becomes a
/// [`GroupError::Delegate`](crate::errors::GroupError::Delegate) naming the handle.
pub type OpResult<T> = std::result::Result<T, String>;

/// Trait for operations a [`ValueHandle`](crate::value_handle::ValueHandle) can run
/// against its state.
pub trait Operation: Send + Sync {
    fn name(&self) -> &'static str;
    /// Accepted number of positional arguments.
    fn arity(&self) -> std::ops::RangeInclusive<usize>;
    fn call(&self, state: &Value, args: &Arguments) -> OpResult<Value>;
}

/// Thread-safe operation registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Operation>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut map: HashMap<&'static str, Arc<dyn Operation>> = HashMap::new();
        map.insert("get", Arc::new(builtins::Get));
        map.insert("scale", Arc::new(builtins::Scale));
        map.insert("offset", Arc::new(builtins::Offset));
        map.insert("lower", Arc::new(builtins::Lower));
        map.insert("upper", Arc::new(builtins::Upper));
        map.insert("first", Arc::new(builtins::First));
        map.insert("unique", Arc::new(builtins::Unique));
        map.insert("pick", Arc::new(builtins::Pick));
        Self { inner: Arc::new(map) }
    }

    pub fn register<O: Operation + 'static>(&mut self, op: O) {
        let mut_map = Arc::make_mut(&mut self.inner);
        mut_map.insert(op.name(), Arc::new(op));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.inner.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Fetch a required keyword argument.
pub fn required<'a>(op: &str, args: &'a Arguments, key: &str) -> OpResult<&'a Value> {
    args.keyword(key)
        .ok_or_else(|| format!("`{op}` needs keyword argument `{key}`"))
}

pub mod builtins {
    use super::*;
    use itertools::Itertools;
    use serde_json::Number;

    pub struct Get;
    impl Operation for Get {
        fn name(&self) -> &'static str { "get" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, state: &Value, _args: &Arguments) -> OpResult<Value> {
            Ok(state.clone())
        }
    }

    pub struct Scale;
    impl Operation for Scale {
        fn name(&self) -> &'static str { "scale" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, state: &Value, args: &Arguments) -> OpResult<Value> {
            let factor = required(self.name(), args, "factor")?;
            arithmetic(self.name(), state, factor, i64::checked_mul, |a, b| a * b)
        }
    }

    pub struct Offset;
    impl Operation for Offset {
        fn name(&self) -> &'static str { "offset" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, state: &Value, args: &Arguments) -> OpResult<Value> {
            let by = required(self.name(), args, "by")?;
            arithmetic(self.name(), state, by, i64::checked_add, |a, b| a + b)
        }
    }

    pub struct Lower;
    impl Operation for Lower {
        fn name(&self) -> &'static str { "lower" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, state: &Value, _args: &Arguments) -> OpResult<Value> {
            Ok(match state {
                Value::String(t) => Value::String(t.to_lowercase()),
                other => other.clone(),
            })
        }
    }

    pub struct Upper;
    impl Operation for Upper {
        fn name(&self) -> &'static str { "upper" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, state: &Value, _args: &Arguments) -> OpResult<Value> {
            Ok(match state {
                Value::String(t) => Value::String(t.to_uppercase()),
                other => other.clone(),
            })
        }
    }

    /// First element of an array state; null otherwise.
    pub struct First;
    impl Operation for First {
        fn name(&self) -> &'static str { "first" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, state: &Value, _args: &Arguments) -> OpResult<Value> {
            Ok(match state {
                Value::Array(a) => a.first().cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            })
        }
    }

    /// Deduplicate an array state; identity for non-arrays.
    pub struct Unique;
    impl Operation for Unique {
        fn name(&self) -> &'static str { "unique" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, state: &Value, _args: &Arguments) -> OpResult<Value> {
            Ok(match state {
                Value::Array(a) => Value::Array(
                    a.iter()
                        .cloned()
                        .unique_by(|x| serde_json::to_string(x).unwrap_or_default())
                        .collect(),
                ),
                other => other.clone(),
            })
        }
    }

    /// Object member named by `key`, taken from the keywords or the first
    /// positional argument.
    pub struct Pick;
    impl Operation for Pick {
        fn name(&self) -> &'static str { "pick" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=1 }
        fn call(&self, state: &Value, args: &Arguments) -> OpResult<Value> {
            let key = match args.positional.first() {
                Some(k) => k,
                None => required(self.name(), args, "key")?,
            };
            let key = key
                .as_str()
                .ok_or_else(|| "`pick` key must be a string".to_string())?;
            Ok(state.get(key).cloned().unwrap_or(Value::Null))
        }
    }

    fn arithmetic(
        op: &str,
        state: &Value,
        operand: &Value,
        int: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> OpResult<Value> {
        let (Value::Number(a), Value::Number(b)) = (state, operand) else {
            return Err(format!("`{op}` needs numbers, got {state} and {operand}"));
        };
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            if let Some(r) = int(x, y) {
                return Ok(Value::Number(r.into()));
            }
        }
        let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
        Number::from_f64(float(x, y))
            .map(Value::Number)
            .ok_or_else(|| format!("`{op}` produced a non-finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(name: &str, state: Value, args: Arguments) -> OpResult<Value> {
        Registry::with_builtins().get(name).unwrap().call(&state, &args)
    }

    #[test]
    fn scale_keeps_integers() {
        let args = Arguments::new().with_keyword("factor", json!(3));
        assert_eq!(run("scale", json!(4), args).unwrap(), json!(12));
        let args = Arguments::new().with_keyword("factor", json!(0.5));
        assert_eq!(run("scale", json!(3), args).unwrap(), json!(1.5));
    }

    #[test]
    fn offset_requires_by() {
        assert!(run("offset", json!(1), Arguments::new()).is_err());
        let args = Arguments::new().with_keyword("by", json!(-2));
        assert_eq!(run("offset", json!(1), args).unwrap(), json!(-1));
    }

    #[test]
    fn array_helpers() {
        assert_eq!(run("first", json!([7, 8]), Arguments::new()).unwrap(), json!(7));
        assert_eq!(run("first", json!("x"), Arguments::new()).unwrap(), json!(null));
        assert_eq!(run("unique", json!([1, 1, 2, 1]), Arguments::new()).unwrap(), json!([1, 2]));
    }

    #[test]
    fn pick_by_keyword_or_position() {
        let state = json!({"a": 1});
        let kw = Arguments::new().with_keyword("key", json!("a"));
        assert_eq!(run("pick", state.clone(), kw).unwrap(), json!(1));
        let pos = Arguments::new().with_positional(json!("zz"));
        assert_eq!(run("pick", state, pos).unwrap(), json!(null));
    }

    #[test]
    fn register_custom() {
        struct Negate;
        impl Operation for Negate {
            fn name(&self) -> &'static str { "negate" }
            fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
            fn call(&self, state: &Value, _args: &Arguments) -> OpResult<Value> {
                Ok(json!(-state.as_i64().unwrap_or(0)))
            }
        }
        let mut registry = Registry::with_builtins();
        registry.register(Negate);
        assert!(registry.contains("negate"));
        assert_eq!(registry.get("negate").unwrap().call(&json!(5), &Arguments::new()).unwrap(), json!(-5));
    }
}

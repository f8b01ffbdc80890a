//! Key casing transform.

use tparams_core::{Casing, Key, Value};

use super::Transform;

/// Re-cases the node's key and, recursively, every hash key inside its
/// value. Indices are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCasing(pub Casing);

impl KeyCasing {
    fn transform_value(&self, value: Value) -> Value {
        match value {
            Value::Hash(h) => Value::Hash(
                h.into_iter()
                    .map(|(k, v)| (self.0.apply(&k), self.transform_value(v)))
                    .collect(),
            ),
            Value::Array(a) => Value::Array(a.into_iter().map(|v| self.transform_value(v)).collect()),
            other => other,
        }
    }
}

impl Transform for KeyCasing {
    fn call(&self, key: Key, value: Value) -> (Option<Key>, Value) {
        let key = match key {
            Key::Name(n) => Key::Name(self.0.apply(&n)),
            other => other,
        };
        (Some(key), self.transform_value(value))
    }
}

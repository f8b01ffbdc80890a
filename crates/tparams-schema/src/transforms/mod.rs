//! # Transforms
//!
//! Rule objects run by the transformer stage. Each receives a node's
//! `(key, value)` and returns the replacement pair; returning no key
//! removes the node.
//!
//! A schema materializes its transforms in a fixed order: [`KeyAlias`],
//! [`NilifyBlanks`], [`Custom`], [`KeyCasing`], then [`Noop`].

use std::sync::Arc;

use tparams_core::{Key, Value};

mod key_casing;

pub use key_casing::KeyCasing;

/// A transform rule.
pub trait Transform: Send + Sync {
    fn call(&self, key: Key, value: Value) -> (Option<Key>, Value);
}

/// Renames the node (`as:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAlias(pub String);

impl Transform for KeyAlias {
    fn call(&self, _key: Key, value: Value) -> (Option<Key>, Value) {
        (Some(Key::Name(self.0.clone())), value)
    }
}

/// Replaces blank scalars with `nil`. Containers are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NilifyBlanks;

impl Transform for NilifyBlanks {
    fn call(&self, key: Key, value: Value) -> (Option<Key>, Value) {
        if value.is_scalar() && value.is_blank() {
            (Some(key), Value::Nil)
        } else {
            (Some(key), value)
        }
    }
}

/// Removes the node from the output while keeping it validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl Transform for Noop {
    fn call(&self, _key: Key, value: Value) -> (Option<Key>, Value) {
        (None, value)
    }
}

type CustomFn = Arc<dyn Fn(Key, Value) -> (Option<Key>, Value) + Send + Sync>;

/// A user-supplied transform (`transform:`).
#[derive(Clone)]
pub struct Custom(CustomFn);

impl Custom {
    pub fn new(f: impl Fn(Key, Value) -> (Option<Key>, Value) + Send + Sync + 'static) -> Self {
        Custom(Arc::new(f))
    }
}

impl Transform for Custom {
    fn call(&self, key: Key, value: Value) -> (Option<Key>, Value) {
        (self.0)(key, value)
    }
}

impl std::fmt::Debug for Custom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Custom(..)")
    }
}

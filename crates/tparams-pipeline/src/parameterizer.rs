//! # Parameterizer
//!
//! Wraps a raw input [`Value`] into a [`ParamTree`] according to a schema.
//!
//! - Declared hash children are wrapped recursively; undeclared keys are
//!   rejected by a strict schema and dropped by a lenient one. A hash
//!   declared with an empty body permits nothing.
//! - Endless arrays wrap every element against the single item schema.
//!   Bounded arrays may not be longer than their declared items. A strict
//!   schema reports the overflow at the array's own path; a lenient one
//!   truncates the array to its declared items.
//! - Scalars, untyped bodies and values whose shape does not match the
//!   schema are wrapped as leaves, left for the validator to judge.

use indexmap::IndexMap;
use tparams_core::{Configuration, Error, Key, Value};
use tparams_schema::{Children, Schema};

use crate::parameter::{Body, NodeId, ParamTree};

/// Builds a [`ParamTree`] from raw input.
///
/// Lenient schemas never fail on shape: undeclared hash keys are dropped
/// and bounded arrays longer than their declared items are cut back to
/// that length. Both are logged at debug level only.
pub struct Parameterizer<'s> {
    schema: &'s Schema,
    config: Configuration,
}

impl<'s> Parameterizer<'s> {
    /// A parameterizer using the process-wide configuration.
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_config(schema, tparams_core::config())
    }

    pub fn with_config(schema: &'s Schema, config: Configuration) -> Self {
        Self { schema, config }
    }

    /// Wrap `value`. A `nil` input yields no tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnpermittedParameter`] when a strict schema meets an
    /// undeclared key or an overflowing bounded array.
    pub fn call(&self, value: Value) -> Result<Option<ParamTree<'s>>, Error> {
        if value.is_nil() {
            return Ok(None);
        }
        let mut tree = ParamTree::new(self.config.path_casing);
        self.wrap(&mut tree, Key::Root, value, self.schema, None)?;
        Ok(Some(tree))
    }

    fn wrap(
        &self,
        tree: &mut ParamTree<'s>,
        key: Key,
        value: Value,
        schema: &'s Schema,
        parent: Option<NodeId>,
    ) -> Result<NodeId, Error> {
        let id = tree.push(key, schema, parent);

        let body = match (schema.children(), value) {
            (Some(Children::Hash(declared)), Value::Hash(raw)) if schema.is_hash() => {
                let mut children = IndexMap::with_capacity(raw.len());
                for (name, child_value) in raw {
                    match declared.get(&name) {
                        Some(child) => {
                            let child_id =
                                self.wrap(tree, Key::Name(name.clone()), child_value, child, Some(id))?;
                            children.insert(name, child_id);
                        }
                        None if schema.is_strict() => {
                            return Err(Error::unpermitted(
                                "unpermitted parameter",
                                tree.path(id).join(&Key::Name(name)),
                                schema.source(),
                            ));
                        }
                        None => {
                            let path = tree.path(id).join(&Key::Name(name));
                            tracing::debug!(%path, "dropped unpermitted parameter");
                        }
                    }
                }
                Body::Hash(children)
            }
            (Some(Children::Array(declared)), Value::Array(mut raw)) if schema.is_array() => {
                if schema.is_indexed() && raw.len() > declared.len() {
                    if schema.is_strict() {
                        return Err(Error::unpermitted(
                            "unpermitted parameter",
                            tree.path(id),
                            schema.source(),
                        ));
                    }
                    tracing::debug!(
                        path = %tree.path(id),
                        dropped = raw.len() - declared.len(),
                        "dropped unpermitted array items"
                    );
                    raw.truncate(declared.len());
                }

                let mut slots = Vec::with_capacity(raw.len());
                for (i, item) in raw.into_iter().enumerate() {
                    let key = Key::Index(i);
                    // Every index below the bound (or any index when
                    // endless) has a schema.
                    if let Some(child) = schema.child(&key) {
                        slots.push(Some(self.wrap(tree, key, item, child, Some(id))?));
                    }
                }
                Body::Array(slots)
            }
            (_, value) => Body::Leaf(value),
        };

        tree.set_body(id, body);
        Ok(id)
    }
}

//! # Validator
//!
//! Checks every node against its schema, post-order. Per node:
//!
//! 1. `nil` passes when the schema allows nil, or is optional while
//!    `ignore_nil_optionals` is on; otherwise it fails.
//! 2. A blank value fails unless `allow_blank`. Containers with declared
//!    children are exempt: their children's presence rules apply instead.
//!    A blank value that is allowed skips the rule validations.
//! 3. The value must match the schema type (subtypes included).
//! 4. Required declared children must be present.
//! 5. Untyped container bodies may only hold scalars unless
//!    `allow_non_scalars`.
//! 6. Rule validations run in declaration order.
//!
//! A missing root is checked separately, since it never becomes a tree.

use tparams_core::{types, Configuration, Error, Path, Value};
use tparams_schema::{Children, Schema};

use crate::mapper::depth_first_map;
use crate::parameter::{NodeId, ParamTree};
use crate::pipeline::Step;

#[derive(Debug, Clone, Copy)]
pub struct Validator {
    config: Configuration,
}

impl Validator {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    /// Check a root that is absent from the input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when the root is required.
    pub fn validate_missing_root(&self, schema: &Schema) -> Result<(), Error> {
        if schema.is_required() {
            return Err(Error::invalid(
                "is missing",
                Path::root().with_casing(self.config.path_casing),
                schema.source(),
            ));
        }
        Ok(())
    }

    fn visit(&self, tree: &ParamTree<'_>, id: NodeId) -> Result<(), Error> {
        let schema = tree.schema(id);
        let invalid = |message: String, path: Path| Error::invalid(message, path, schema.source());
        let value = tree.value(id);

        if value.is_nil() {
            if schema.allows_nil() || (schema.is_optional() && self.config.ignore_nil_optionals) {
                return Ok(());
            }
            return Err(invalid("cannot be null".into(), tree.path(id)));
        }

        let declared = schema.has_children() && tree.is_wrapped(id);
        let blank = value.is_blank() && !declared;
        if blank && !schema.allows_blank() {
            return Err(invalid("cannot be blank".into(), tree.path(id)));
        }

        if schema.ty().mismatches(&value) {
            let actual = types::for_value(&value, &[])
                .map_or_else(|_| "unknown".to_string(), |t| t.humanize());
            return Err(invalid(
                format!("type mismatch (received {actual} expected {})", schema.ty().humanize()),
                tree.path(id),
            ));
        }

        if tree.is_wrapped(id) {
            self.check_presence(tree, id, schema)?;
        }

        if schema.children().is_none() && !schema.allows_non_scalars() {
            match &value {
                Value::Hash(h) if !h.values().all(Value::is_scalar) => {
                    return Err(invalid(
                        "unpermitted type (expected object of scalar types)".into(),
                        tree.path(id),
                    ));
                }
                Value::Array(a) if !a.iter().all(Value::is_scalar) => {
                    return Err(invalid(
                        "unpermitted type (expected array of scalar types)".into(),
                        tree.path(id),
                    ));
                }
                _ => {}
            }
        }

        if blank {
            return Ok(());
        }
        for validation in schema.validations() {
            if let Err(e) = validation.validate(&value) {
                let path = &tree.path(id) + e.path.as_ref();
                return Err(invalid(e.message, path));
            }
        }
        Ok(())
    }

    /// Every required declared child must be present, unless the bouncer
    /// removed it for failing its guard. Only hashes and bounded arrays
    /// declare children by key.
    fn check_presence(&self, tree: &ParamTree<'_>, id: NodeId, schema: &Schema) -> Result<(), Error> {
        let keyed = match schema.children() {
            Some(Children::Hash(_)) => true,
            Some(Children::Array(_)) => schema.is_indexed(),
            None => false,
        };
        if !keyed {
            return Ok(());
        }
        for key in schema.keys() {
            let Some(child) = schema.child(&key) else {
                continue;
            };
            let absent = tree.child(id, &key).is_none() && !tree.is_bounced(id, &key);
            if child.is_required() && absent {
                return Err(Error::invalid("is missing", tree.path(id).join(&key), child.source()));
            }
        }
        Ok(())
    }
}

impl Step for Validator {
    fn name(&self) -> &'static str {
        "validator"
    }

    fn call(&self, tree: &mut ParamTree<'_>) -> Result<(), Error> {
        depth_first_map(tree, |tree, id| self.visit(tree, id))
    }
}

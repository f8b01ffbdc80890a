//! # Transformer
//!
//! Applies each node's transforms, post-order, so a parent always sees
//! its children's final keys and values.
//!
//! For every node the transforms run in sequence over its `(key, value)`
//! pair. A transform returning no key removes the node. Between steps,
//! a `nil` value on an optional, non-nillable node is dropped when
//! `ignore_nil_optionals` is on. A changed key moves the node within its
//! parent, replacing any sibling already stored under that key.
//!
//! A container node with transforms is collapsed into a leaf holding its
//! transformed value.

use tparams_core::{Configuration, Error};
use tparams_schema::Schema;

use crate::mapper::depth_first_map;
use crate::parameter::{NodeId, ParamTree};
use crate::pipeline::Step;

#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    config: Configuration,
}

impl Transformer {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    fn drops_nil(&self, schema: &Schema, is_nil: bool) -> bool {
        is_nil
            && schema.is_optional()
            && !schema.allows_nil()
            && self.config.ignore_nil_optionals
    }

    fn visit(&self, tree: &mut ParamTree<'_>, id: NodeId) -> Result<(), Error> {
        let schema = tree.schema(id);
        if self.drops_nil(schema, tree.is_nil(id)) {
            tracing::trace!(path = %tree.path(id), "dropped nil optional parameter");
            return tree.delete(id);
        }
        if schema.transforms().is_empty() {
            return Ok(());
        }

        let original = tree.key(id).clone();
        let mut key = original.clone();
        let mut value = tree.value(id);
        for transform in schema.transforms() {
            let (next_key, next_value) = transform.call(key, value);
            let Some(next_key) = next_key else {
                return tree.delete(id);
            };
            if self.drops_nil(schema, next_value.is_nil()) {
                return tree.delete(id);
            }
            key = next_key;
            value = next_value;
        }

        tree.set_value(id, value);
        if key != original && tree.parent(id).is_some() {
            tracing::trace!(from = %original, to = %key, "renamed parameter");
            tree.rename(id, key)?;
        }
        Ok(())
    }
}

impl Step for Transformer {
    fn name(&self) -> &'static str {
        "transformer"
    }

    fn call(&self, tree: &mut ParamTree<'_>) -> Result<(), Error> {
        depth_first_map(tree, |tree, id| self.visit(tree, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameterizer::Parameterizer;
    use serde_json::json;
    use tparams_core::{Casing, Key, Value};
    use tparams_schema::Options;

    fn build(options: Options) -> Schema {
        Schema::build_with(options, None, &Configuration::default()).unwrap()
    }

    fn transform_with(
        schema: &Schema,
        input: serde_json::Value,
        config: Configuration,
    ) -> Result<serde_json::Value, Error> {
        let mut tree = Parameterizer::with_config(schema, config)
            .call(Value::from(input))?
            .unwrap();
        Transformer::new(config).call(&mut tree)?;
        Ok(tree.unwrap_with(None, None)?.to_json())
    }

    fn transform(schema: &Schema, input: serde_json::Value) -> Result<serde_json::Value, Error> {
        transform_with(schema, input, Configuration::default())
    }

    #[test]
    fn test_transforms_run_depth_first() {
        let schema = build(
            Options::new()
                .transform(|k, v| {
                    let sum = v.as_hash().map_or(0, |h| h.values().filter_map(Value::as_i64).sum());
                    (Some(k), Value::from(sum))
                })
                .children(|s| {
                    s.param("a", Options::of("integer").transform(|k, v| (Some(k), Value::from(v.as_i64().unwrap_or(0) + 1))));
                    s.param("b", Options::of("integer").transform(|k, v| (Some(k), Value::from(v.as_i64().unwrap_or(0) * 10))));
                }),
        );
        assert_eq!(transform(&schema, json!({"a": 1, "b": 2})).unwrap(), json!(22));
    }

    #[test]
    fn test_array_item_rename_leaves_hole() {
        let schema = build(Options::of("array").children(|s| {
            s.items(Options::of("integer").transform(|_, v| (Some(Key::Index(1)), v)));
        }));
        assert_eq!(transform(&schema, json!([2])).unwrap(), json!([null, 2]));
    }

    #[test]
    fn test_name_inside_array_is_rejected() {
        let schema = build(Options::of("array").children(|s| {
            s.items(Options::of("integer").transform(|_, v| (Some(Key::from("x")), v)));
        }));
        assert!(matches!(transform(&schema, json!([1])), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_root_deletion() {
        let schema = build(Options::new().transform(|_, v| (None, v)));
        assert!(matches!(transform(&schema, json!({})), Err(Error::RootDeletion)));

        let schema = build(Options::new().transform(|k, _| (Some(k), Value::Nil)));
        assert_eq!(transform(&schema, json!({"a": 1})).unwrap(), json!(null));
    }

    #[test]
    fn test_noop_removes_param() {
        let schema = build(Options::new().children(|s| {
            s.param("foo", Options::of("string").noop(true));
            s.param("bar", Options::of("string"));
        }));
        assert_eq!(transform(&schema, json!({"foo": "x", "bar": "y"})).unwrap(), json!({"bar": "y"}));
    }

    #[test]
    fn test_alias_renames_and_replaces() {
        let schema = build(Options::new().children(|s| {
            s.param("foo", Options::of("string").as_key("bar"));
            s.param("baz", Options::of("string"));
        }));
        assert_eq!(
            transform(&schema, json!({"foo": "x", "baz": "y"})).unwrap(),
            json!({"baz": "y", "bar": "x"})
        );
    }

    #[test]
    fn test_alias_then_transform_back() {
        let schema = build(Options::new().children(|s| {
            s.param("foo", Options::of("string").as_key("bar").transform(|_, v| (Some(Key::from("foo")), v)));
        }));
        assert_eq!(transform(&schema, json!({"foo": "x"})).unwrap(), json!({"foo": "x"}));
    }

    #[test]
    fn test_nilify_blanks() {
        let schema = build(Options::new().children(|s| {
            s.param("foo", Options::of("string").allow_blank(true).nilify_blanks(true));
            s.param("tags", Options::of("array").allow_blank(true).nilify_blanks(true));
        }));
        assert_eq!(
            transform(&schema, json!({"foo": "", "tags": []})).unwrap(),
            json!({"foo": null, "tags": []})
        );
    }

    #[test]
    fn test_ignore_nil_optionals() {
        let schema = build(Options::new().children(|s| {
            s.param("opt", Options::of("string").optional(true));
            s.param("nilable", Options::of("string").optional(true).allow_nil(true));
            s.param("blank", Options::of("string").optional(true).nilify_blanks(true));
            s.param("req", Options::of("string").allow_nil(true));
        }));
        let input = json!({"opt": null, "nilable": null, "blank": "", "req": null});
        assert_eq!(
            transform_with(&schema, input.clone(), Configuration::default().with_ignore_nil_optionals(true)).unwrap(),
            json!({"nilable": null, "req": null})
        );
        assert_eq!(
            transform(&schema, input).unwrap(),
            json!({"opt": null, "nilable": null, "blank": null, "req": null})
        );
    }

    #[test]
    fn test_key_casing_collapses_containers() {
        let config = Configuration::default().with_key_casing(Some(Casing::LowerCamel));
        let schema = Schema::build_with(
            Options::new().children(|s| {
                s.param("first_name", Options::of("string"));
                s.param("home_address", Options::of("hash").children(|s| {
                    s.param("street_name", Options::of("string"));
                }));
                s.param("raw_meta", Options::of("hash").casing(None).allow_non_scalars(true));
            }),
            None,
            &config,
        )
        .unwrap();
        let out = transform_with(
            &schema,
            json!({"first_name": "a", "home_address": {"street_name": "b"}, "raw_meta": {"inner_key": 1}}),
            config,
        )
        .unwrap();
        assert_eq!(
            out,
            json!({"firstName": "a", "homeAddress": {"streetName": "b"}, "rawMeta": {"innerKey": 1}})
        );
    }
}

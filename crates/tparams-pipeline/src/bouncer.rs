//! # Bouncer
//!
//! Enforces `if`/`unless` guards, top-down. A node whose guard fails is
//! rejected with an unpermitted-parameter error when its schema is strict,
//! or deleted together with its whole branch when lenient. Descendants of
//! a bounced node are never evaluated.

use tparams_core::Error;
use tparams_schema::{Controller, Schema};

use crate::parameter::{NodeId, ParamTree};
use crate::pipeline::Step;

pub struct Bouncer<'c> {
    controller: Option<&'c dyn Controller>,
}

impl<'c> Bouncer<'c> {
    pub fn new(controller: Option<&'c dyn Controller>) -> Self {
        Self { controller }
    }

    /// Whether the node's guards let it through.
    fn permits(&self, schema: &Schema) -> Result<bool, Error> {
        if let Some(guard) = schema.if_guard() {
            if !guard.evaluate(self.controller)? {
                return Ok(false);
            }
        }
        if let Some(guard) = schema.unless_guard() {
            if guard.evaluate(self.controller)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn visit(&self, tree: &mut ParamTree<'_>, id: NodeId) -> Result<(), Error> {
        let schema = tree.schema(id);
        if !self.permits(schema)? {
            let path = tree.path(id);
            if schema.is_strict() {
                return Err(Error::unpermitted("unpermitted parameter", path, schema.source()));
            }
            tracing::debug!(%path, "bounced guarded parameter");
            return tree.bounce(id);
        }

        for child in tree.children(id) {
            if !tree.is_detached(child) {
                self.visit(tree, child)?;
            }
        }
        Ok(())
    }
}

impl Step for Bouncer<'_> {
    fn name(&self) -> &'static str {
        "bouncer"
    }

    fn call(&self, tree: &mut ParamTree<'_>) -> Result<(), Error> {
        let root = tree.root();
        self.visit(tree, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameterizer::Parameterizer;
    use serde_json::json;
    use tparams_core::{Configuration, Source, Value};
    use tparams_schema::{Guard, Options};

    struct Admin(bool);

    impl Controller for Admin {
        fn predicate(&self, name: &str) -> Option<bool> {
            (name == "admin").then_some(self.0)
        }
    }

    fn bounce(
        schema: &Schema,
        input: serde_json::Value,
        controller: Option<&dyn Controller>,
    ) -> Result<serde_json::Value, Error> {
        let mut tree = Parameterizer::with_config(schema, Configuration::default())
            .call(Value::from(input))?
            .unwrap();
        Bouncer::new(controller).call(&mut tree)?;
        Ok(tree.unwrap_with(None, None)?.to_json())
    }

    fn guarded(strict: bool) -> Schema {
        Schema::build_with(
            Options::new().strict(strict).children(|s| {
                s.param("foo", Options::of("string").when(|_| false));
                s.param("bar", Options::of("string").unless(|_| true));
                s.param("baz", Options::of("string").when(|_| true).unless(|_| false));
            }),
            None,
            &Configuration::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_lenient_bounces_guarded_params() {
        let out = bounce(&guarded(false), json!({"foo": "a", "bar": "b", "baz": "c"}), None).unwrap();
        assert_eq!(out, json!({"baz": "c"}));
    }

    #[test]
    fn test_strict_raises_on_guarded_params() {
        let err = bounce(&guarded(true), json!({"foo": "a"}), None).unwrap_err();
        assert!(matches!(err, Error::UnpermittedParameter { .. }));
        assert_eq!(err.path().unwrap().to_json_pointer(), "/foo");

        let err = bounce(&guarded(true), json!({"bar": "b"}), None).unwrap_err();
        assert_eq!(err.path().unwrap().to_json_pointer(), "/bar");

        assert!(bounce(&guarded(true), json!({"baz": "c"}), None).is_ok());
    }

    #[test]
    fn test_bounced_branch_is_not_descended() {
        let schema = Schema::build_with(
            Options::new().lenient().children(|s| {
                s.param("outer", Options::of("hash").when(|_| false).children(|s| {
                    s.param("inner", Options::of("string").if_guard(Guard::named("missing")));
                }));
                s.param("sibling", Options::of("string"));
            }),
            None,
            &Configuration::default(),
        )
        .unwrap();
        let out = bounce(&schema, json!({"outer": {"inner": "x"}, "sibling": "y"}), None).unwrap();
        assert_eq!(out, json!({"sibling": "y"}));
    }

    #[test]
    fn test_named_guards_resolve_on_controller() {
        let schema = Schema::build_with(
            Options::new().lenient().children(|s| {
                s.param("role", Options::of("string").if_guard(Guard::named("admin")));
            }),
            None,
            &Configuration::default(),
        )
        .unwrap();
        let input = json!({"role": "owner"});
        assert_eq!(bounce(&schema, input.clone(), Some(&Admin(true))).unwrap(), input);
        assert_eq!(bounce(&schema, input.clone(), Some(&Admin(false))).unwrap(), json!({}));
        assert!(matches!(bounce(&schema, input, None), Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_lenient_root_bounce_is_root_deletion() {
        let schema = Schema::build_with(
            Options::new().lenient().when(|_| false),
            None,
            &Configuration::default(),
        )
        .unwrap();
        assert!(matches!(bounce(&schema, json!({}), None), Err(Error::RootDeletion)));
    }

    #[test]
    fn test_error_carries_source() {
        let schema = Schema::build_with(
            Options::new().source(Some(Source::Params)).children(|s| {
                s.param("foo", Options::of("string").when(|_| false));
            }),
            None,
            &Configuration::default(),
        )
        .unwrap();
        let err = bounce(&schema, json!({"foo": "a"}), None).unwrap_err();
        assert_eq!(err.origin(), Some(Source::Params));
    }
}

//! Plain formatter: nests the output under the controller's resource
//! name, e.g. `{ user: { .. } }` for a `users` controller.

use tparams_core::Value;

use super::{singularize, Formatter};

pub const NAME: &str = "plain";

pub fn formatter() -> Formatter {
    Formatter::new(NAME, |value, ctx| {
        let resource = ctx.controller.and_then(|c| c.resource_name());
        Ok(match resource {
            Some(name) => Value::hash([(singularize(&name), value)]),
            None => value,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::FormatContext;
    use crate::guard::Controller;
    use crate::options::Options;
    use crate::schema::Schema;
    use tparams_core::Configuration;

    struct Users;

    impl Controller for Users {
        fn predicate(&self, _name: &str) -> Option<bool> {
            None
        }

        fn resource_name(&self) -> Option<String> {
            Some("users".into())
        }
    }

    #[test]
    fn test_wraps_under_singular_resource() {
        let schema = Schema::build_with(Options::new(), None, &Configuration::default()).unwrap();
        let ctx = FormatContext {
            schema: &schema,
            controller: Some(&Users),
        };
        let out = formatter().call(Value::hash([("email", Value::from("a@b.example"))]), &ctx).unwrap();
        assert_eq!(out, Value::hash([("user", Value::hash([("email", Value::from("a@b.example"))]))]));
    }

    #[test]
    fn test_identity_without_resource() {
        let schema = Schema::build_with(Options::new(), None, &Configuration::default()).unwrap();
        let ctx = FormatContext {
            schema: &schema,
            controller: None,
        };
        let value = Value::hash([("email", Value::from("a@b.example"))]);
        assert_eq!(formatter().call(value.clone(), &ctx).unwrap(), value);
    }
}

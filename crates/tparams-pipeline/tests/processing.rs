//! Integration tests: full processing of request parameters.
//!
//! Each test builds a schema, runs `process` end to end and checks either
//! the unwrapped output or the error path a client would see.

use proptest::prelude::*;
use serde_json::json;
use tparams_core::{Casing, Configuration, Error, Value};
use tparams_pipeline::{process, Format, ProcessOptions};
use tparams_schema::{Controller, Options, Schema, SchemaDef};

fn build(options: Options, config: &Configuration) -> Schema {
    Schema::build_with(options, None, config).unwrap()
}

fn run_with(
    schema: &Schema,
    input: serde_json::Value,
    options: &ProcessOptions<'_>,
) -> Result<serde_json::Value, Error> {
    Ok(process(schema, Value::from(input), options)?
        .map(|v| v.to_json())
        .unwrap_or(serde_json::Value::Null))
}

fn run(schema: &Schema, input: serde_json::Value) -> Result<serde_json::Value, Error> {
    let options = ProcessOptions {
        config: Configuration::default(),
        ..ProcessOptions::default()
    };
    run_with(schema, input, &options)
}

fn user_schema() -> Schema {
    build(
        Options::new().children(|s| {
            s.param("email", Options::of("string").matching(regex::Regex::new("@").unwrap()));
            s.param("age", Options::of("integer").coerce(true).optional(true));
            s.param("roles", Options::of("array").optional(true).children(|s| {
                s.items(Options::of("string").one_of(["admin", "editor"]));
            }));
            s.param("address", Options::of("hash").optional(true).children(|s| {
                s.param("street", Options::of("string"));
                s.param("zip", Options::of("string").optional(true).allow_blank(true));
            }));
        }),
        &Configuration::default(),
    )
}

// ─── End-to-end processing ──────────────────────────────────────────

#[test]
fn test_accepts_valid_user() {
    let out = run(
        &user_schema(),
        json!({"email": "a@b.c", "age": "42", "roles": ["admin"], "address": {"street": "Main"}}),
    )
    .unwrap();
    assert_eq!(
        out,
        json!({"email": "a@b.c", "age": 42, "roles": ["admin"], "address": {"street": "Main"}})
    );
}

#[test]
fn test_error_paths_point_at_offender() {
    let schema = user_schema();

    let err = run(&schema, json!({"email": "a@b.c", "roles": ["admin", "root"]})).unwrap_err();
    assert_eq!(err.path().unwrap().to_json_pointer(), "/roles/1");
    assert_eq!(err.kind(), "invalid_parameter");

    let err = run(&schema, json!({"email": "a@b.c", "address": {}})).unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "address.street");
    assert_eq!(err.to_string(), "is missing");

    let err = run(&schema, json!({"email": "a@b.c", "age": "old"})).unwrap_err();
    assert_eq!(err.to_string(), "failed to coerce string to integer");

    let err = run(&schema, json!({"email": "a@b.c", "admin": true})).unwrap_err();
    assert!(matches!(err, Error::UnpermittedParameter { .. }));
    assert_eq!(err.path().unwrap().to_json_pointer(), "/admin");
}

#[test]
fn test_lenient_schema_drops_unknown_keys() {
    let schema = build(
        Options::new().lenient().children(|s| {
            s.param("name", Options::of("string"));
        }),
        &Configuration::default(),
    );
    assert_eq!(run(&schema, json!({"name": "a", "extra": 1})).unwrap(), json!({"name": "a"}));
}

fn guarded_required(strict: bool) -> Schema {
    build(
        Options::new().strict(strict).children(|s| {
            s.param("foo", Options::of("string").when(|_| false));
            s.param("bar", Options::of("string"));
        }),
        &Configuration::default(),
    )
}

#[test]
fn test_lenient_guard_drops_required_param_silently() {
    let schema = guarded_required(false);
    assert_eq!(run(&schema, json!({"foo": "a", "bar": "b"})).unwrap(), json!({"bar": "b"}));

    let err = run(&schema, json!({"foo": "a"})).unwrap_err();
    assert_eq!(err.path().unwrap().to_json_pointer(), "/bar");
    assert_eq!(err.to_string(), "is missing");
}

#[test]
fn test_strict_guard_on_required_param() {
    let schema = guarded_required(true);

    let err = run(&schema, json!({"foo": "a", "bar": "b"})).unwrap_err();
    assert!(matches!(err, Error::UnpermittedParameter { .. }));
    assert_eq!(err.path().unwrap().to_json_pointer(), "/foo");

    let err = run(&schema, json!({"bar": "b"})).unwrap_err();
    assert_eq!(err.kind(), "invalid_parameter");
    assert_eq!(err.path().unwrap().to_json_pointer(), "/foo");
    assert_eq!(err.to_string(), "is missing");
}

#[test]
fn test_rename_then_revert_keeps_original_key() {
    let schema = build(
        Options::new().children(|s| {
            s.param("foo", Options::of("string").as_key("bar"));
            s.param("baz", Options::of("string").as_key("qux").transform(|_, v| (Some("baz".into()), v)));
        }),
        &Configuration::default(),
    );
    assert_eq!(
        run(&schema, json!({"foo": "x", "baz": "y"})).unwrap(),
        json!({"bar": "x", "baz": "y"})
    );
}

// ─── Casing ─────────────────────────────────────────────────────────

#[test]
fn test_key_and_path_casing() {
    let config = Configuration::default()
        .with_key_casing(Some(Casing::LowerCamel))
        .with_path_casing(Some(Casing::LowerCamel));
    let schema = build(
        Options::new().children(|s| {
            s.param("first_name", Options::of("string"));
            s.param("billing_address", Options::of("hash").children(|s| {
                s.param("postal_code", Options::of("string"));
            }));
        }),
        &config,
    );
    let options = ProcessOptions {
        config,
        ..ProcessOptions::default()
    };

    let out = run_with(
        &schema,
        json!({"first_name": "Ada", "billing_address": {"postal_code": "12345"}}),
        &options,
    )
    .unwrap();
    assert_eq!(out, json!({"firstName": "Ada", "billingAddress": {"postalCode": "12345"}}));

    let err = run_with(
        &schema,
        json!({"first_name": "Ada", "billing_address": {"postal_code": 12345}}),
        &options,
    )
    .unwrap_err();
    assert_eq!(err.path().unwrap().to_json_pointer(), "/billingAddress/postalCode");
}

// ─── Formatters ─────────────────────────────────────────────────────

struct Users;

impl Controller for Users {
    fn predicate(&self, name: &str) -> Option<bool> {
        (name == "admin").then_some(false)
    }

    fn resource_name(&self) -> Option<String> {
        Some("users".into())
    }
}

#[test]
fn test_jsonapi_document() {
    let schema = build(
        Options::new().children(|s| {
            s.format("jsonapi");
            s.param("data", Options::of("hash").children(|s| {
                s.param("type", Options::of("string").one_of(["users"]));
                s.param("id", Options::of("string"));
                s.param("attributes", Options::of("hash").children(|s| {
                    s.param("name", Options::of("string"));
                    s.param("role", Options::of("string").optional(true).if_guard(tparams_schema::Guard::named("admin")).lenient());
                }));
                s.param("relationships", Options::of("hash").optional(true).children(|s| {
                    s.param("team", Options::of("hash").children(|s| {
                        s.param("data", Options::of("hash").children(|s| {
                            s.param("type", Options::of("string"));
                            s.param("id", Options::of("string"));
                        }));
                    }));
                }));
            }));
        }),
        &Configuration::default(),
    );
    let options = ProcessOptions {
        config: Configuration::default(),
        controller: Some(&Users),
        ..ProcessOptions::default()
    };
    let out = run_with(
        &schema,
        json!({
            "data": {
                "type": "users",
                "id": "1",
                "attributes": {"name": "Ada"},
                "relationships": {"team": {"data": {"type": "teams", "id": "7"}}}
            }
        }),
        &options,
    )
    .unwrap();
    assert_eq!(out, json!({"id": "1", "name": "Ada", "team_id": "7"}));
}

#[test]
fn test_plain_format_nests_under_resource() {
    let schema = build(
        Options::new().children(|s| {
            s.param("name", Options::of("string"));
        }),
        &Configuration::default(),
    );
    let format = Format::Named("plain".into());
    let options = ProcessOptions {
        config: Configuration::default(),
        controller: Some(&Users),
        format: &format,
    };
    assert_eq!(
        run_with(&schema, json!({"name": "Ada"}), &options).unwrap(),
        json!({"user": {"name": "Ada"}})
    );
}

#[test]
fn test_definition_document() {
    let def = SchemaDef::from_yaml(
        r#"
params:
  title: { type: string, length: { maximum: 5 } }
  tags:
    type: array
    optional: true
    items: { type: string }
"#,
    )
    .unwrap();
    let schema = def.build(None, &Configuration::default()).unwrap();
    assert_eq!(run(&schema, json!({"title": "hi", "tags": ["a"]})).unwrap(), json!({"title": "hi", "tags": ["a"]}));

    let err = run(&schema, json!({"title": "too long"})).unwrap_err();
    assert_eq!(err.to_string(), "length must be less than or equal to 5");
}

// ─── Properties ─────────────────────────────────────────────────────

fn scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        any::<i64>().prop_map(serde_json::Value::from),
        any::<bool>().prop_map(serde_json::Value::from),
        "[a-z ]{1,12}".prop_map(serde_json::Value::from),
    ]
}

proptest! {
    #[test]
    fn prop_untyped_hash_passes_through(
        entries in proptest::collection::btree_map("[a-z]{1,8}", scalar(), 0..8)
    ) {
        let schema = build(Options::of("hash"), &Configuration::default());
        let input = serde_json::Value::Object(entries.into_iter().collect());
        let out = run(&schema, input.clone()).unwrap();
        prop_assert_eq!(out, input);
    }

    #[test]
    fn prop_strict_rejects_any_undeclared_key(key in "[a-z]{1,8}") {
        prop_assume!(key != "name");
        let schema = build(
            Options::new().children(|s| { s.param("name", Options::of("string")); }),
            &Configuration::default(),
        );
        let mut input = json!({"name": "a"});
        input[key.as_str()] = json!(1);
        let err = run(&schema, input).unwrap_err();
        prop_assert_eq!(err.path().unwrap().to_json_pointer(), format!("/{key}"));
    }
}

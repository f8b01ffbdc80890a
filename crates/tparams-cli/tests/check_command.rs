//! Integration tests: `tparams check` against schema and input files.
//!
//! Fixtures are written to a temporary directory; the command output is
//! captured in memory and parsed back as JSON.

use std::path::PathBuf;

use serde_json::json;
use tparams_cli::check::{run_check, CheckArgs};

const USER_SCHEMA: &str = r#"
params:
  first_name: { type: string }
  age: { type: integer, coerce: true, optional: true }
  role: { type: string, optional: true, if: admin }
  address:
    type: hash
    optional: true
    params:
      street: { type: string }
"#;

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn check(args: &CheckArgs) -> (u8, serde_json::Value) {
    let mut out = Vec::new();
    let code = run_check(args, &mut out).unwrap();
    (code, serde_json::from_slice(&out).unwrap())
}

#[test]
fn test_accepted_input_is_printed() {
    let dir = tempfile::tempdir().unwrap();
    let args = CheckArgs {
        schema: write(&dir, "user.yaml", USER_SCHEMA),
        input: Some(write(&dir, "req.json", r#"{"first_name": "Ada", "age": "36"}"#)),
        format: "auto".into(),
        ..CheckArgs::default()
    };
    let (code, out) = check(&args);
    assert_eq!(code, 0);
    assert_eq!(out, json!({"first_name": "Ada", "age": 36}));
}

#[test]
fn test_rejected_input_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let args = CheckArgs {
        schema: write(&dir, "user.yaml", USER_SCHEMA),
        input: Some(write(&dir, "req.json", r#"{"first_name": "Ada", "address": {}}"#)),
        format: "auto".into(),
        path_casing: Some("lower_camel".into()),
        ..CheckArgs::default()
    };
    let (code, out) = check(&args);
    assert_eq!(code, 1);
    assert_eq!(out["kind"], "invalid_parameter");
    assert_eq!(out["error"], "is missing");
    assert_eq!(out["pointer"], "/address/street");
}

#[test]
fn test_named_guard_uses_grants() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(&dir, "user.yaml", USER_SCHEMA);
    let input = write(&dir, "req.yaml", "first_name: Ada\nrole: owner\n");

    let denied = CheckArgs {
        schema: schema.clone(),
        input: Some(input.clone()),
        format: "auto".into(),
        ..CheckArgs::default()
    };
    let (code, out) = check(&denied);
    assert_eq!(code, 1);
    assert_eq!(out["kind"], "unpermitted_parameter");
    assert_eq!(out["path"], "role");

    let granted = CheckArgs {
        grants: vec!["admin".into()],
        ..denied
    };
    let (code, out) = check(&granted);
    assert_eq!(code, 0);
    assert_eq!(out, json!({"first_name": "Ada", "role": "owner"}));
}

#[test]
fn test_key_casing_and_plain_format() {
    let dir = tempfile::tempdir().unwrap();
    let args = CheckArgs {
        schema: write(&dir, "user.yaml", USER_SCHEMA),
        input: Some(write(&dir, "req.json", r#"{"first_name": "Ada"}"#)),
        format: "plain".into(),
        key_casing: Some("lower_camel".into()),
        resource: Some("users".into()),
        ..CheckArgs::default()
    };
    let (code, out) = check(&args);
    assert_eq!(code, 0);
    assert_eq!(out, json!({"user": {"firstName": "Ada"}}));
}

#[test]
fn test_operational_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = Vec::new();

    let missing = CheckArgs {
        schema: dir.path().join("nope.yaml"),
        input: Some(write(&dir, "req.json", "{}")),
        format: "auto".into(),
        ..CheckArgs::default()
    };
    assert!(run_check(&missing, &mut out).is_err());

    let bad_schema = CheckArgs {
        schema: write(&dir, "bad.yaml", "params:\n  x: { type: strnig }\n"),
        ..missing
    };
    assert!(run_check(&bad_schema, &mut out).is_err());

    let unknown_format = CheckArgs {
        schema: write(&dir, "user.yaml", USER_SCHEMA),
        format: "xml".into(),
        ..bad_schema
    };
    assert!(run_check(&unknown_format, &mut out).is_err());
    assert!(out.is_empty());
}

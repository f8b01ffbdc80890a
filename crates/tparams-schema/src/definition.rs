//! # Declarative Schema Definitions
//!
//! A [`SchemaDef`] is the data form of the builder API, read from YAML or
//! JSON:
//!
//! ```yaml
//! format_as: jsonapi
//! params:
//!   email: { type: string, format: { with: "@" } }
//!   age:   { type: integer, coerce: true, optional: true }
//!   roles:
//!     type: array
//!     items: { type: string, inclusion: { in: [admin, editor] } }
//! ```
//!
//! Guards can only be named (`if: admin?`-style predicates resolved on the
//! controller), since a document cannot carry closures. Custom validations
//! and transforms are likewise builder-only.
//!
//! Option shapes are checked when the definition is converted, so a
//! definition either yields a [`Schema`] or a [`SchemaError`]; nothing is
//! deferred to processing time.

use std::path::Path as FsPath;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use tparams_core::{Casing, Configuration, Source, Value};

use crate::error::SchemaError;
use crate::guard::{Controller, Guard};
use crate::options::Options;
use crate::schema::Schema;
use crate::validations::{FormatRule, LengthRule, Membership, Span};

/// One schema node as written in a definition document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDef {
    #[serde(rename = "type")]
    pub ty: Option<String>,
    /// Named children of a hash node, in declaration order.
    pub params: Option<IndexMap<String, SchemaDef>>,
    /// Schema of every element of an endless array.
    pub items: Option<Box<SchemaDef>>,
    /// Positional schemas of a bounded array.
    pub item: Option<Vec<SchemaDef>>,
    pub strict: Option<bool>,
    pub optional: Option<bool>,
    pub allow_nil: Option<bool>,
    pub allow_blank: Option<bool>,
    pub allow_non_scalars: Option<bool>,
    pub coerce: Option<bool>,
    pub polymorphic: Option<bool>,
    pub nilify_blanks: Option<bool>,
    pub noop: Option<bool>,
    pub source: Option<Source>,
    #[serde(rename = "as")]
    pub as_key: Option<String>,
    pub alias: Option<String>,
    /// Key casing; `none` disables an inherited casing.
    pub casing: Option<String>,
    #[serde(rename = "if")]
    pub if_guard: Option<String>,
    #[serde(rename = "unless")]
    pub unless_guard: Option<String>,
    pub inclusion: Option<MembershipDef>,
    pub exclusion: Option<MembershipDef>,
    pub format: Option<FormatDef>,
    pub length: Option<LengthDef>,
    pub depth: Option<usize>,
    /// Output formatter; root only.
    pub format_as: Option<String>,
}

/// `inclusion`/`exclusion` options: `{ in: [..] }` or `{ in: { min, max } }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipDef {
    #[serde(rename = "in")]
    pub set: Option<SetDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SetDef {
    Range { min: f64, max: f64 },
    Values(Vec<Value>),
}

/// `format` option: exactly one of `with` or `without`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatDef {
    pub with: Option<String>,
    pub without: Option<String>,
}

/// `length` option: `minimum` and/or `maximum`, or exactly one of
/// `within`, `in`, `is`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LengthDef {
    pub minimum: Option<usize>,
    pub maximum: Option<usize>,
    pub within: Option<SpanDef>,
    #[serde(rename = "in")]
    pub in_span: Option<SpanDef>,
    pub is: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SpanDef {
    Range { min: usize, max: usize },
    List(Vec<usize>),
}

impl SchemaDef {
    /// Parse a YAML document. JSON documents are valid YAML too.
    pub fn from_yaml(src: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(src).map_err(|e| SchemaError::Definition(e.to_string()))
    }

    pub fn from_json(src: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(src).map_err(|e| SchemaError::Definition(e.to_string()))
    }

    /// Read a definition file; `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn from_path(path: &FsPath) -> Result<Self, SchemaError> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Definition(format!("{}: {e}", path.display())))?;
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&src)
        } else {
            Self::from_yaml(&src)
        }
    }

    /// Build the root schema this definition describes.
    pub fn build(
        &self,
        controller: Option<&dyn Controller>,
        config: &Configuration,
    ) -> Result<Schema, SchemaError> {
        if self.format_as.is_some() && !self.has_body() {
            return Err(SchemaError::InvalidOption(
                "format_as requires params, item or items".into(),
            ));
        }
        Schema::build_with(self.to_options(true)?, controller, config)
    }

    fn has_body(&self) -> bool {
        self.params.is_some() || self.items.is_some() || self.item.is_some()
    }

    /// Convert into builder options, checking every option's shape.
    pub fn to_options(&self, root: bool) -> Result<Options, SchemaError> {
        if !root && self.format_as.is_some() {
            return Err(SchemaError::FormatOnChild);
        }

        let mut options = Options::new();
        if let Some(ty) = &self.ty {
            options = options.ty(ty.clone());
        }

        let flags: [(Option<bool>, fn(Options, bool) -> Options); 9] = [
            (self.strict, Options::strict),
            (self.optional, Options::optional),
            (self.allow_nil, Options::allow_nil),
            (self.allow_blank, Options::allow_blank),
            (self.allow_non_scalars, Options::allow_non_scalars),
            (self.coerce, Options::coerce),
            (self.polymorphic, Options::polymorphic),
            (self.nilify_blanks, Options::nilify_blanks),
            (self.noop, Options::noop),
        ];
        for (flag, set) in flags {
            if let Some(flag) = flag {
                options = set(options, flag);
            }
        }

        if let Some(source) = self.source {
            options = options.source(Some(source));
        }
        if let Some(key) = &self.as_key {
            options = options.as_key(key.clone());
        }
        if let Some(alias) = &self.alias {
            options = options.alias(alias.clone());
        }
        if let Some(casing) = &self.casing {
            let casing = Casing::parse_opt(casing).map_err(|e| SchemaError::InvalidOption(e.to_string()))?;
            options = options.casing(casing);
        }
        if let Some(name) = &self.if_guard {
            options = options.if_guard(Guard::named(name.clone()));
        }
        if let Some(name) = &self.unless_guard {
            options = options.unless_guard(Guard::named(name.clone()));
        }
        if let Some(def) = &self.inclusion {
            options = options.inclusion(def.to_membership("inclusion")?);
        }
        if let Some(def) = &self.exclusion {
            options = options.exclusion(def.to_membership("exclusion")?);
        }
        if let Some(def) = &self.format {
            options = options.format(def.to_rule()?);
        }
        if let Some(def) = &self.length {
            options = options.length(def.to_rule()?);
        }
        if let Some(depth) = self.depth {
            options = options.max_depth(depth);
        }

        if let Some(body) = self.body()? {
            let format_as = self.format_as.clone();
            options = options.children(move |s| {
                if let Some(name) = &format_as {
                    s.format(name);
                }
                match &body {
                    Body::Params(params) => {
                        for (key, child) in params {
                            s.param(key.clone(), child.clone());
                        }
                    }
                    Body::Items(child) => {
                        s.items(child.clone());
                    }
                    Body::Item(children) => {
                        for child in children {
                            s.item(child.clone());
                        }
                    }
                }
            });
        }

        Ok(options)
    }

    fn body(&self) -> Result<Option<Body>, SchemaError> {
        match (&self.params, &self.items, &self.item) {
            (None, None, None) => Ok(None),
            (Some(params), None, None) => params
                .iter()
                .map(|(key, def)| Ok((key.clone(), def.to_options(false)?)))
                .collect::<Result<_, SchemaError>>()
                .map(|params| Some(Body::Params(params))),
            (None, Some(items), None) => Ok(Some(Body::Items(items.to_options(false)?))),
            (None, None, Some(item)) => item
                .iter()
                .map(|def| def.to_options(false))
                .collect::<Result<_, SchemaError>>()
                .map(|item| Some(Body::Item(item))),
            _ => Err(SchemaError::InvalidOption(
                "only one of params, items or item may be given".into(),
            )),
        }
    }
}

enum Body {
    Params(Vec<(String, Options)>),
    Items(Options),
    Item(Vec<Options>),
}

impl MembershipDef {
    fn to_membership(&self, option: &str) -> Result<Membership, SchemaError> {
        match &self.set {
            Some(SetDef::Values(values)) => Ok(Membership::Values(values.clone())),
            Some(SetDef::Range { min, max }) => Ok(Membership::Range {
                start: *min,
                end: *max,
            }),
            None => Err(SchemaError::InvalidOption(format!("{option} requires an in: set"))),
        }
    }
}

impl FormatDef {
    fn to_rule(&self) -> Result<FormatRule, SchemaError> {
        let compile = |rx: &str| {
            Regex::new(rx).map_err(|e| SchemaError::InvalidOption(format!("format: {e}")))
        };
        match (&self.with, &self.without) {
            (Some(rx), None) => Ok(FormatRule::With(compile(rx)?)),
            (None, Some(rx)) => Ok(FormatRule::Without(compile(rx)?)),
            _ => Err(SchemaError::InvalidOption(
                "format requires exactly one of with or without".into(),
            )),
        }
    }
}

impl LengthDef {
    fn to_rule(&self) -> Result<LengthRule, SchemaError> {
        let span = |def: &SpanDef| match def {
            SpanDef::Range { min, max } => Span::Range(*min..=*max),
            SpanDef::List(list) => Span::List(list.clone()),
        };
        let rule = match (self.minimum, self.maximum, &self.within, &self.in_span, self.is) {
            (Some(minimum), Some(maximum), None, None, None) => LengthRule::Between { minimum, maximum },
            (Some(n), None, None, None, None) => LengthRule::Minimum(n),
            (None, Some(n), None, None, None) => LengthRule::Maximum(n),
            (None, None, Some(def), None, None) => LengthRule::Within(span(def)),
            (None, None, None, Some(def), None) => LengthRule::In(span(def)),
            (None, None, None, None, Some(n)) => LengthRule::Is(n),
            _ => {
                return Err(SchemaError::InvalidOption(
                    "length requires minimum/maximum or exactly one of within, in, is".into(),
                ))
            }
        };
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validations::Validation;
    use tparams_core::Key;

    fn build(src: &str) -> Result<Schema, SchemaError> {
        SchemaDef::from_yaml(src)?.build(None, &Configuration::default())
    }

    #[test]
    fn test_builds_nested_schema() {
        let schema = build(
            r#"
params:
  email: { type: string, format: { with: "@" } }
  age: { type: integer, coerce: true, optional: true }
  roles:
    type: array
    items: { type: string, inclusion: { in: [admin, editor] } }
  point:
    type: array
    item:
      - { type: float }
      - { type: float }
"#,
        )
        .unwrap();
        assert_eq!(schema.keys().len(), 4);
        let age = schema.child(&Key::from("age")).unwrap();
        assert!(age.coerces() && age.is_optional());
        let roles = schema.child(&Key::from("roles")).unwrap();
        assert!(roles.is_endless());
        assert_eq!(roles.child(&Key::Index(7)).unwrap().validations().len(), 1);
        let point = schema.child(&Key::from("point")).unwrap();
        assert!(point.is_indexed());
        assert_eq!(point.keys().len(), 2);
    }

    #[test]
    fn test_json_definition() {
        let def = SchemaDef::from_json(r#"{"params": {"id": {"type": "integer", "as": "user_id"}}}"#).unwrap();
        let schema = def.build(None, &Configuration::default()).unwrap();
        assert_eq!(schema.child(&Key::from("id")).unwrap().as_key(), Some("user_id"));
    }

    #[test]
    fn test_format_as_binds_formatter() {
        let schema = build("format_as: jsonapi\nparams:\n  data: { type: hash }\n").unwrap();
        assert_eq!(schema.formatter().map(|f| f.name()), Some("jsonapi"));
    }

    #[test]
    fn test_format_as_rejected_below_root() {
        let err = build("params:\n  data: { type: hash, format_as: jsonapi, params: {} }\n").unwrap_err();
        assert_eq!(err, SchemaError::FormatOnChild);
    }

    #[test]
    fn test_option_shapes_checked() {
        let err = build("params:\n  s: { type: string, length: { is: 1, within: [1, 2] } }\n").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOption(_)));

        let err = build("params:\n  s: { type: string, format: { with: a, without: b } }\n").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOption(_)));

        let err = build("params:\n  s: { type: string, inclusion: {} }\n").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOption(_)));

        let err = build("params:\n  s: { type: string, format: { with: \"(\" } }\n").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOption(_)));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = build("params:\n  s: { type: string, requried: true }\n").unwrap_err();
        assert!(matches!(err, SchemaError::Definition(_)));
    }

    #[test]
    fn test_conflicting_bodies() {
        let err = build("type: array\nitems: { type: string }\nitem: [{ type: string }]\n").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOption(_)));
    }

    #[test]
    fn test_named_guards_and_casing() {
        let schema = build("casing: dash\nparams:\n  secret: { type: string, if: admin, casing: none }\n").unwrap();
        assert_eq!(schema.casing(), Some(Casing::Dash));
        let secret = schema.child(&Key::from("secret")).unwrap();
        assert!(matches!(secret.if_guard(), Some(Guard::Named(name)) if name == "admin"));
        assert_eq!(secret.casing(), None);
    }

    #[test]
    fn test_length_range_and_membership_range() {
        let schema = build(
            "params:\n  n: { type: integer, inclusion: { in: { min: 1, max: 5 } } }\n  s: { type: string, length: { within: { min: 1, max: 3 } } }\n",
        )
        .unwrap();
        let n = schema.child(&Key::from("n")).unwrap();
        assert!(n.validations()[0].validate(&Value::from(3)).is_ok());
        assert!(n.validations()[0].validate(&Value::from(6)).is_err());
        let s = schema.child(&Key::from("s")).unwrap();
        assert!(s.validations()[0].validate(&Value::from("abcd")).is_err());
    }
}

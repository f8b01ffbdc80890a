//! # Type Registry
//!
//! Types are named matcher/coercer records. The registry keeps them in three
//! namespaces:
//!
//! - **nominal** types, which [`for_value`] scans to detect the type of an
//!   arbitrary value;
//! - **subtypes**, which refine a nominal *archetype* and are only detected
//!   when a caller names them as candidates;
//! - **abstract** types, which match values (so they can be declared on a
//!   schema) but are never the detected type of a value.
//!
//! ## Built-ins
//!
//! Nominal: `boolean`, `string`, `symbol`, `integer`, `float`, `decimal`,
//! `date`, `time`, `nil` (labelled "null"), `array`, `hash` (labelled
//! "object"). Abstract: `number`, `any`.
//!
//! ## Coercion
//!
//! Every built-in coercer is idempotent: coercing an already coerced value
//! returns it unchanged. Numeric and temporal coercers map `nil` and blank
//! strings to `nil`, and reject text that does not parse rather than
//! guessing.
//!
//! ## Concurrency
//!
//! The process-wide registry sits behind a `parking_lot::RwLock`. It is
//! expected to be written at startup and read concurrently afterwards.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{CoercionError, TypeError};
use crate::value::Value;

/// Predicate deciding whether a value belongs to a type.
pub type Matcher = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Conversion of an arbitrary value into a type.
pub type Coercer = Arc<dyn Fn(&Value) -> Result<Value, CoercionError> + Send + Sync>;

/// Structural kind of a type's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Array,
    Hash,
}

/// A registered type.
#[derive(Clone)]
pub struct Type {
    name: String,
    label: String,
    archetype: Option<Arc<Type>>,
    abstract_type: bool,
    shape: Shape,
    matcher: Matcher,
    coercer: Option<Coercer>,
}

impl Type {
    /// Registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human name of this type alone (e.g. "object" for `hash`).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn archetype(&self) -> Option<&Type> {
        self.archetype.as_deref()
    }

    pub fn is_subtype(&self) -> bool {
        self.archetype.is_some()
    }

    pub fn is_abstract(&self) -> bool {
        self.abstract_type
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_array(&self) -> bool {
        self.shape == Shape::Array
    }

    pub fn is_hash(&self) -> bool {
        self.shape == Shape::Hash
    }

    pub fn is_scalar(&self) -> bool {
        self.shape == Shape::Scalar
    }

    /// Only container types accept a nested schema body.
    pub fn accepts_block(&self) -> bool {
        self.shape != Shape::Scalar
    }

    pub fn is_coercible(&self) -> bool {
        self.coercer.is_some()
    }

    pub fn matches(&self, value: &Value) -> bool {
        (self.matcher)(value)
    }

    pub fn mismatches(&self, value: &Value) -> bool {
        !self.matches(value)
    }

    /// Coerce `value` into this type.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] when the value cannot be converted or the
    /// type has no coercer.
    pub fn coerce(&self, value: &Value) -> Result<Value, CoercionError> {
        match &self.coercer {
            Some(coerce) => coerce(value),
            None => Err(CoercionError::new(value, self.humanize())),
        }
    }

    /// Human name including the archetype, e.g. "shallow object".
    pub fn humanize(&self) -> String {
        match &self.archetype {
            Some(archetype) => format!("{} {}", self.label, archetype.humanize()),
            None => self.label.clone(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name)
            .field("archetype", &self.archetype.as_ref().map(|a| a.name.clone()))
            .field("abstract", &self.abstract_type)
            .field("shape", &self.shape)
            .field("coercible", &self.coercer.is_some())
            .finish()
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.humanize())
    }
}

/// Builder for a type registration.
pub struct TypeDef {
    name: String,
    label: Option<String>,
    archetype: Option<String>,
    abstract_type: bool,
    shape: Shape,
    matcher: Matcher,
    coercer: Option<Coercer>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, matcher: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            label: None,
            archetype: None,
            abstract_type: false,
            shape: Shape::Scalar,
            matcher: Arc::new(matcher),
            coercer: None,
        }
    }

    /// Human label; defaults to the name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Register as a subtype refining the named nominal type. The subtype
    /// inherits its archetype's shape.
    pub fn archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.abstract_type = true;
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn coerce(
        mut self,
        coercer: impl Fn(&Value) -> Result<Value, CoercionError> + Send + Sync + 'static,
    ) -> Self {
        self.coercer = Some(Arc::new(coercer));
        self
    }
}

/// Namespace a type is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Nominal,
    Subtype,
    Abstract,
}

/// An ordered set of types split into namespaces.
#[derive(Default)]
pub struct TypeRegistry {
    types: IndexMap<String, Type>,
    subtypes: IndexMap<String, Type>,
    abstracts: IndexMap<String, Type>,
}

impl TypeRegistry {
    /// A registry with no types at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for def in builtins() {
            // Built-in names are distinct and their archetypes come first.
            if let Err(e) = registry.register(def) {
                tracing::error!(error = %e, "failed to register built-in type");
            }
        }
        registry
    }

    /// Register a type.
    ///
    /// # Errors
    ///
    /// - [`TypeError::Duplicate`] if the name is taken in any namespace.
    /// - [`TypeError::UnknownArchetype`] if a subtype's archetype is not a
    ///   registered nominal type.
    pub fn register(&mut self, def: TypeDef) -> Result<Type, TypeError> {
        if self.namespace(&def.name).is_some() {
            return Err(TypeError::Duplicate(def.name));
        }

        let archetype = match &def.archetype {
            Some(name) => match self.types.get(name) {
                Some(t) => Some(Arc::new(t.clone())),
                None => {
                    return Err(TypeError::UnknownArchetype {
                        name: def.name,
                        archetype: name.clone(),
                    })
                }
            },
            None => None,
        };

        let shape = archetype.as_ref().map_or(def.shape, |a| a.shape);
        let ty = Type {
            label: def.label.unwrap_or_else(|| def.name.clone()),
            name: def.name,
            archetype,
            abstract_type: def.abstract_type,
            shape,
            matcher: def.matcher,
            coercer: def.coercer,
        };

        let namespace = if ty.abstract_type {
            &mut self.abstracts
        } else if ty.archetype.is_some() {
            &mut self.subtypes
        } else {
            &mut self.types
        };
        namespace.insert(ty.name.clone(), ty.clone());
        tracing::debug!(name = %ty.name, "registered type");

        Ok(ty)
    }

    /// Remove a type from whichever namespace holds it.
    pub fn unregister(&mut self, name: &str) -> Option<Type> {
        let removed = self
            .types
            .shift_remove(name)
            .or_else(|| self.subtypes.shift_remove(name))
            .or_else(|| self.abstracts.shift_remove(name));
        if removed.is_some() {
            tracing::debug!(name, "unregistered type");
        }
        removed
    }

    /// Which namespace holds `name`, if any.
    pub fn namespace(&self, name: &str) -> Option<Namespace> {
        if self.types.contains_key(name) {
            Some(Namespace::Nominal)
        } else if self.subtypes.contains_key(name) {
            Some(Namespace::Subtype)
        } else if self.abstracts.contains_key(name) {
            Some(Namespace::Abstract)
        } else {
            None
        }
    }

    /// Exact lookup across all namespaces.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Unknown`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Type, TypeError> {
        self.types
            .get(name)
            .or_else(|| self.subtypes.get(name))
            .or_else(|| self.abstracts.get(name))
            .cloned()
            .ok_or_else(|| TypeError::Unknown(name.to_string()))
    }

    /// Detect the type of `value`.
    ///
    /// Candidate subtypes in `candidates` are tried first, in order; unknown
    /// or abstract candidates are skipped. Otherwise the first matching
    /// nominal type wins.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::NoMatch`] if no nominal type matches.
    pub fn for_value(&self, value: &Value, candidates: &[&str]) -> Result<Type, TypeError> {
        let candidate = candidates
            .iter()
            .filter_map(|name| self.subtypes.get(*name))
            .find(|t| t.matches(value));
        if let Some(t) = candidate {
            return Ok(t.clone());
        }

        self.types
            .values()
            .find(|t| t.matches(value))
            .cloned()
            .ok_or_else(|| TypeError::NoMatch(value.to_string()))
    }
}

// ─── Process-wide registry ──────────────────────────────────────────

static REGISTRY: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();

fn registry() -> &'static RwLock<TypeRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(TypeRegistry::with_builtins()))
}

/// Register a type in the process-wide registry.
///
/// # Errors
///
/// See [`TypeRegistry::register`].
pub fn register(def: TypeDef) -> Result<Type, TypeError> {
    registry().write().register(def)
}

/// Remove a type from the process-wide registry.
pub fn unregister(name: &str) -> Option<Type> {
    registry().write().unregister(name)
}

/// Exact lookup in the process-wide registry.
///
/// # Errors
///
/// Returns [`TypeError::Unknown`] if nothing is registered under `name`.
pub fn get(name: &str) -> Result<Type, TypeError> {
    registry().read().get(name)
}

/// Namespace of `name` in the process-wide registry.
pub fn namespace(name: &str) -> Option<Namespace> {
    registry().read().namespace(name)
}

/// Detect the type of a value using the process-wide registry.
///
/// # Errors
///
/// Returns [`TypeError::NoMatch`] if no nominal type matches.
pub fn for_value(value: &Value, candidates: &[&str]) -> Result<Type, TypeError> {
    registry().read().for_value(value, candidates)
}

// ─── Built-in types ─────────────────────────────────────────────────

fn builtins() -> Vec<TypeDef> {
    vec![
        TypeDef::new("boolean", |v| matches!(v, Value::Bool(_))).coerce(coerce_boolean),
        TypeDef::new("string", |v| matches!(v, Value::String(_))).coerce(coerce_string),
        TypeDef::new("symbol", |v| matches!(v, Value::Symbol(_))).coerce(coerce_symbol),
        TypeDef::new("integer", |v| matches!(v, Value::Integer(_))).coerce(coerce_integer),
        TypeDef::new("float", |v| matches!(v, Value::Float(_))).coerce(coerce_float),
        TypeDef::new("decimal", |v| matches!(v, Value::Decimal(_))).coerce(coerce_decimal),
        TypeDef::new("date", |v| matches!(v, Value::Date(_))).coerce(coerce_date),
        TypeDef::new("time", |v| matches!(v, Value::Time(_))).coerce(coerce_time),
        TypeDef::new("nil", Value::is_nil)
            .label("null")
            .coerce(|_| Ok(Value::Nil)),
        TypeDef::new("array", Value::is_array)
            .shape(Shape::Array)
            .coerce(coerce_array),
        TypeDef::new("hash", Value::is_hash)
            .label("object")
            .shape(Shape::Hash)
            .coerce(coerce_hash),
        TypeDef::new("number", |v| {
            matches!(v, Value::Integer(_) | Value::Float(_) | Value::Decimal(_))
        })
        .abstract_type(),
        TypeDef::new("any", |_| true).abstract_type(),
    ]
}

/// `nil` and blank text coerce to `nil` for numeric and temporal types.
fn blank_to_nil(value: &Value) -> bool {
    match value {
        Value::Nil => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn coerce_boolean(value: &Value) -> Result<Value, CoercionError> {
    if blank_to_nil(value) {
        return Ok(Value::Nil);
    }
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Integer(1) => Ok(Value::Bool(true)),
        Value::Integer(0) => Ok(Value::Bool(false)),
        Value::String(s) | Value::Symbol(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "f" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(CoercionError::new(value, "boolean")),
        },
        _ => Err(CoercionError::new(value, "boolean")),
    }
}

fn coerce_string(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Array(_) | Value::Hash(_) => Err(CoercionError::new(value, "string")),
        other => Ok(Value::String(other.to_string())),
    }
}

fn coerce_symbol(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::String(s) | Value::Symbol(s) => Ok(Value::Symbol(s.clone())),
        _ => Err(CoercionError::new(value, "symbol")),
    }
}

fn coerce_integer(value: &Value) -> Result<Value, CoercionError> {
    if blank_to_nil(value) {
        return Ok(Value::Nil);
    }
    let fail = || CoercionError::new(value, "integer");
    match value {
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) if f.is_finite() => f.trunc().to_i64().map(Value::Integer).ok_or_else(fail),
        Value::Decimal(d) => d.trunc().to_i64().map(Value::Integer).ok_or_else(fail),
        Value::Time(t) => Ok(Value::Integer(t.timestamp())),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => Ok(Value::Integer(i)),
                Err(_) => Decimal::from_str(s)
                    .ok()
                    .and_then(|d| d.trunc().to_i64())
                    .map(Value::Integer)
                    .ok_or_else(fail),
            }
        }
        _ => Err(fail()),
    }
}

fn coerce_float(value: &Value) -> Result<Value, CoercionError> {
    if blank_to_nil(value) {
        return Ok(Value::Nil);
    }
    let fail = || CoercionError::new(value, "float");
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Decimal(d) => d.to_f64().map(Value::Float).ok_or_else(fail),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(fail),
        _ => Err(fail()),
    }
}

fn coerce_decimal(value: &Value) -> Result<Value, CoercionError> {
    if blank_to_nil(value) {
        return Ok(Value::Nil);
    }
    let fail = || CoercionError::new(value, "decimal");
    match value {
        Value::Decimal(d) => Ok(Value::Decimal(*d)),
        Value::Integer(i) => Ok(Value::Decimal(Decimal::from(*i))),
        Value::Float(f) => Decimal::try_from(*f).map(Value::Decimal).map_err(|_| fail()),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .map(Value::Decimal)
                .map_err(|_| fail())
        }
        _ => Err(fail()),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc).date_naive()))
}

fn coerce_date(value: &Value) -> Result<Value, CoercionError> {
    if blank_to_nil(value) {
        return Ok(Value::Nil);
    }
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::Time(t) => Ok(Value::Date(t.date_naive())),
        Value::String(s) => parse_date(s.trim())
            .map(Value::Date)
            .ok_or_else(|| CoercionError::new(value, "date")),
        _ => Err(CoercionError::new(value, "date")),
    }
}

fn coerce_time(value: &Value) -> Result<Value, CoercionError> {
    if blank_to_nil(value) {
        return Ok(Value::Nil);
    }
    let fail = || CoercionError::new(value, "time");
    match value {
        Value::Time(t) => Ok(Value::Time(*t)),
        Value::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map(|t| Value::Time(Utc.from_utc_datetime(&t)))
            .ok_or_else(fail),
        Value::Integer(secs) => DateTime::from_timestamp(*secs, 0).map(Value::Time).ok_or_else(fail),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Ok(Value::Time(t.with_timezone(&Utc)));
            }
            if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Ok(Value::Time(Utc.from_utc_datetime(&t)));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|t| Value::Time(Utc.from_utc_datetime(&t)))
                .ok_or_else(fail)
        }
        _ => Err(fail()),
    }
}

fn coerce_array(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Array(a) => Ok(Value::Array(a.clone())),
        Value::Nil => Ok(Value::Array(Vec::new())),
        _ => Err(CoercionError::new(value, "array")),
    }
}

fn coerce_hash(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Hash(h) => Ok(Value::Hash(h.clone())),
        Value::Nil => Ok(Value::Hash(IndexMap::new())),
        _ => Err(CoercionError::new(value, "object")),
    }
}

//! # Dynamic Values
//!
//! Untrusted input enters the system as a [`Value`]: an ordered tree of
//! hashes, arrays and scalars. Hash keys are strings; callers that receive
//! symbol-keyed input normalize it before handing it over.
//!
//! ## Blankness
//!
//! A value is *blank* when it carries no content: `nil`, an empty or
//! whitespace-only string, an empty array, or an empty hash. `false` and
//! numeric zero are present values and are never blank.
//!
//! ## Interchange
//!
//! `Value` converts losslessly from [`serde_json::Value`] (integers stay
//! integers, every other number becomes a float) and serializes through
//! serde, so any self-describing format (JSON, YAML) can feed the pipeline.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered string-keyed map used for hash values.
pub type Hash = IndexMap<String, Value>;

/// A dynamically typed input value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Nil,
    /// `true` or `false`.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Binary floating point number.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// UTF-8 text.
    String(String),
    /// Interned identifier; renders like a string but is a distinct type.
    Symbol(String),
    /// Calendar date without a time zone.
    Date(NaiveDate),
    /// Instant in UTC.
    Time(DateTime<Utc>),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Ordered mapping from string keys to values.
    Hash(Hash),
}

impl Value {
    /// Build a hash value from `(key, value)` pairs, preserving order.
    pub fn hash<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Hash(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a symbol value.
    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_hash(&self) -> bool {
        matches!(self, Value::Hash(_))
    }

    /// Anything that is neither an array nor a hash.
    pub fn is_scalar(&self) -> bool {
        !self.is_array() && !self.is_hash()
    }

    /// Whether the value carries no content. See the module docs.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::String(s) | Value::Symbol(s) => s.trim().is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Hash(h) => h.is_empty(),
            _ => false,
        }
    }

    /// Length for values that have one: characters for text, elements for
    /// containers.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s.chars().count()),
            Value::Array(a) => Some(a.len()),
            Value::Hash(h) => Some(h.len()),
            _ => None,
        }
    }

    /// Look up a key in a hash value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Hash(h) => h.get(key),
            _ => None,
        }
    }

    /// Whether this is a hash containing `key`.
    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers, floats and decimals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Hash> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    /// Convert into a [`serde_json::Value`].
    ///
    /// Decimals, dates and times render as strings; symbols render as their
    /// name; non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Nil => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Integer(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Decimal(d) => Json::String(d.to_string()),
            Value::String(s) | Value::Symbol(s) => Json::String(s.clone()),
            Value::Date(d) => Json::String(format_date(d)),
            Value::Time(t) => Json::String(format_time(t)),
            Value::Array(a) => Json::Array(a.iter().map(Value::to_json).collect()),
            Value::Hash(h) => Json::Object(
                h.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

pub(crate) fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::String(s) | Value::Symbol(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&format_date(d)),
            Value::Time(t) => f.write_str(&format_time(t)),
            Value::Array(_) | Value::Hash(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            Json::Object(o) => Value::Hash(o.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

impl From<Hash> for Value {
    fn from(h: Hash) -> Self {
        Value::Hash(h)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::Nil, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Decimal(d) => Serialize::serialize(d, serializer),
            Value::String(s) | Value::Symbol(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.serialize_str(&format_date(d)),
            Value::Time(t) => serializer.serialize_str(&format_time(t)),
            Value::Array(a) => serializer.collect_seq(a),
            Value::Hash(h) => serializer.collect_map(h),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// The key of a node under its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Sentinel key of a tree root.
    Root,
    /// Key of a hash entry.
    Name(String),
    /// Index of an array element.
    Index(usize),
}

impl Key {
    pub fn is_root(&self) -> bool {
        matches!(self, Key::Root)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            _ => None,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Root => f.write_str("ROOT"),
            Key::Name(n) => f.write_str(n),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

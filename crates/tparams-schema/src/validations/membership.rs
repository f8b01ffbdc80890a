//! Inclusion and exclusion rules.

use tparams_core::Value;

use super::{Validation, ValidationError};

/// The `in` set of an inclusion or exclusion rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Membership {
    /// An explicit list of values.
    Values(Vec<Value>),
    /// An inclusive numeric range.
    Range { start: f64, end: f64 },
}

impl Membership {
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Membership::Values(values) => values.iter().any(|v| same(v, value)),
            Membership::Range { start, end } => value
                .as_f64()
                .map_or(false, |n| n >= *start && n <= *end),
        }
    }
}

/// Equality where numbers compare by magnitude (`1 == 1.0`).
fn same(a: &Value, b: &Value) -> bool {
    let numeric = |v: &Value| matches!(v, Value::Integer(_) | Value::Float(_) | Value::Decimal(_));
    if numeric(a) && numeric(b) {
        return a.as_f64() == b.as_f64();
    }
    a == b
}

/// The value must be a member of the set.
#[derive(Debug, Clone)]
pub struct Inclusion(pub Membership);

impl Validation for Inclusion {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if self.0.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::new("is invalid"))
        }
    }
}

/// The value must not be a member of the set.
#[derive(Debug, Clone)]
pub struct Exclusion(pub Membership);

impl Validation for Exclusion {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if self.0.contains(value) {
            Err(ValidationError::new("is invalid"))
        } else {
            Ok(())
        }
    }
}

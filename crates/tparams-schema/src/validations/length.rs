//! Length rule for text and containers.

use std::ops::RangeInclusive;

use tparams_core::Value;

use super::{Validation, ValidationError};

/// Lengths accepted by `within`/`in`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Range(RangeInclusive<usize>),
    List(Vec<usize>),
}

impl Span {
    fn contains(&self, n: usize) -> bool {
        match self {
            Span::Range(r) => r.contains(&n),
            Span::List(l) => l.contains(&n),
        }
    }

    fn first(&self) -> Option<usize> {
        match self {
            Span::Range(r) => Some(*r.start()),
            Span::List(l) => l.first().copied(),
        }
    }

    fn last(&self) -> Option<usize> {
        match self {
            Span::Range(r) => Some(*r.end()),
            Span::List(l) => l.last().copied(),
        }
    }
}

/// One length constraint. Only `minimum` and `maximum` may be combined,
/// which is what [`LengthRule::Between`] expresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthRule {
    Between { minimum: usize, maximum: usize },
    Minimum(usize),
    Maximum(usize),
    Within(Span),
    In(Span),
    Is(usize),
}

#[derive(Debug, Clone)]
pub struct Length(pub LengthRule);

impl Validation for Length {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(len) = value.len() else {
            return Err(ValidationError::new("length is invalid"));
        };

        let fail = |message: String| Err(ValidationError::new(message));
        match &self.0 {
            LengthRule::Between { minimum, maximum } if len < *minimum || len > *maximum => fail(
                format!("length must be between {minimum} and {maximum} (inclusive)"),
            ),
            LengthRule::Minimum(n) if len < *n => {
                fail(format!("length must be greater than or equal to {n}"))
            }
            LengthRule::Maximum(n) if len > *n => {
                fail(format!("length must be less than or equal to {n}"))
            }
            LengthRule::Within(span) | LengthRule::In(span) if !span.contains(len) => fail(format!(
                "length must be between {} and {}",
                span.first().unwrap_or_default(),
                span.last().unwrap_or_default()
            )),
            LengthRule::Is(n) if len != *n => fail(format!("length must be equal to {n}")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rule: LengthRule, s: &str) -> Result<(), ValidationError> {
        Length(rule).validate(&Value::from(s))
    }

    #[test]
    fn test_between() {
        let rule = || LengthRule::Between { minimum: 1, maximum: 3 };
        assert!(check(rule(), "ab").is_ok());
        assert_eq!(
            check(rule(), "abcd").unwrap_err().message,
            "length must be between 1 and 3 (inclusive)"
        );
    }

    #[test]
    fn test_minimum_and_maximum() {
        assert!(check(LengthRule::Minimum(2), "ab").is_ok());
        assert_eq!(
            check(LengthRule::Minimum(3), "ab").unwrap_err().message,
            "length must be greater than or equal to 3"
        );
        assert!(check(LengthRule::Maximum(2), "ab").is_ok());
        assert_eq!(
            check(LengthRule::Maximum(1), "ab").unwrap_err().message,
            "length must be less than or equal to 1"
        );
    }

    #[test]
    fn test_within_and_in() {
        assert!(check(LengthRule::Within(Span::Range(1..=3)), "abc").is_ok());
        assert_eq!(
            check(LengthRule::Within(Span::Range(1..=3)), "abcd").unwrap_err().message,
            "length must be between 1 and 3"
        );
        assert!(check(LengthRule::In(Span::List(vec![2, 4])), "abcd").is_ok());
        assert!(check(LengthRule::In(Span::List(vec![2, 4])), "abc").is_err());
    }

    #[test]
    fn test_is() {
        assert!(check(LengthRule::Is(3), "abc").is_ok());
        assert_eq!(
            check(LengthRule::Is(2), "abc").unwrap_err().message,
            "length must be equal to 2"
        );
    }

    #[test]
    fn test_containers_and_lengthless_values() {
        let arr = Value::Array(vec![Value::Nil, Value::Nil]);
        assert!(Length(LengthRule::Is(2)).validate(&arr).is_ok());
        assert!(Length(LengthRule::Is(2)).validate(&Value::Integer(12)).is_err());
    }
}

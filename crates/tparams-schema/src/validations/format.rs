//! Regular expression format rule.

use regex::Regex;
use tparams_core::Value;

use super::{Validation, ValidationError};

/// Exactly one of `with` or `without`.
#[derive(Debug, Clone)]
pub enum FormatRule {
    /// The value must match.
    With(Regex),
    /// The value must not match.
    Without(Regex),
}

/// Format validation over the textual form of a scalar.
#[derive(Debug, Clone)]
pub struct Format(pub FormatRule);

impl Validation for Format {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let ok = match value {
            Value::Array(_) | Value::Hash(_) => false,
            scalar => {
                let text = scalar.to_string();
                match &self.0 {
                    FormatRule::With(rx) => rx.is_match(&text),
                    FormatRule::Without(rx) => !rx.is_match(&text),
                }
            }
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::new("format is invalid"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rx(s: &str) -> Regex {
        Regex::new(s).unwrap()
    }

    #[test]
    fn test_with() {
        let rule = Format(FormatRule::With(rx(r"^\d+$")));
        assert!(rule.validate(&Value::from("123")).is_ok());
        assert!(rule.validate(&Value::Integer(42)).is_ok());
        assert_eq!(
            rule.validate(&Value::from("12a")).unwrap_err().message,
            "format is invalid"
        );
    }

    #[test]
    fn test_without() {
        let rule = Format(FormatRule::Without(rx("@")));
        assert!(rule.validate(&Value::from("foo")).is_ok());
        assert!(rule.validate(&Value::from("foo@bar")).is_err());
    }

    #[test]
    fn test_containers_never_match() {
        let rule = Format(FormatRule::Without(rx("x")));
        assert!(rule.validate(&Value::Array(vec![])).is_err());
    }
}

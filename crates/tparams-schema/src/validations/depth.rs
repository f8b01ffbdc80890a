//! Nesting depth rule.

use tparams_core::{Path, Segment, Value};

use super::{Validation, ValidationError};

/// Rejects values whose containers nest deeper than `maximum` levels below
/// the validated node. The error path points at the first container found
/// beyond the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    pub maximum: usize,
}

impl Depth {
    fn check(&self, value: &Value, depth: usize, path: &mut Vec<Segment>) -> Result<(), ValidationError> {
        let children: Vec<(Segment, &Value)> = match value {
            Value::Hash(h) => h.iter().map(|(k, v)| (Segment::Name(k.clone()), v)).collect(),
            Value::Array(a) => a.iter().enumerate().map(|(i, v)| (Segment::Index(i), v)).collect(),
            _ => return Ok(()),
        };

        for (segment, child) in children {
            if child.is_scalar() {
                continue;
            }
            path.push(segment);
            if depth >= self.maximum {
                return Err(ValidationError::new(format!(
                    "maximum depth of {} exceeded",
                    self.maximum
                ))
                .at(Path::new(path.clone())));
            }
            self.check(child, depth + 1, path)?;
            path.pop();
        }
        Ok(())
    }
}

impl Validation for Depth {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.check(value, 0, &mut Vec::new())
    }
}

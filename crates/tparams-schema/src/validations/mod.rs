//! # Validations
//!
//! Stateless rule objects run by the validator stage against a node's
//! value, after presence and type checks have passed. A rule either
//! passes silently or returns a [`ValidationError`], which the validator
//! rewraps into an invalid-parameter error at the node's path.
//!
//! | Rule | Option | Message |
//! |------|--------|---------|
//! | [`Inclusion`] | `inclusion: { in: .. }` | `is invalid` |
//! | [`Exclusion`] | `exclusion: { in: .. }` | `is invalid` |
//! | [`Format`] | `format: { with / without: .. }` | `format is invalid` |
//! | [`Length`] | `length: { .. }` | e.g. `length must be equal to 3` |
//! | [`Depth`] | `depth: { maximum: n }` | `maximum depth of n exceeded` |
//! | [`Custom`] | `validate: ..` | `is invalid`, or the closure's own message |

use std::sync::Arc;

use tparams_core::{Path, Value};

mod depth;
mod format;
mod length;
mod membership;

pub use depth::Depth;
pub use format::{Format, FormatRule};
pub use length::{Length, LengthRule, Span};
pub use membership::{Exclusion, Inclusion, Membership};

/// A failed rule. `path` is relative to the validated node and is only
/// set by rules that inspect nested values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub path: Option<Path>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    pub fn at(mut self, path: Path) -> Self {
        self.path = Some(path);
        self
    }
}

/// A validation rule.
pub trait Validation: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;
}

type CustomFn = Arc<dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync>;

/// A user-supplied rule.
#[derive(Clone)]
pub struct Custom(CustomFn);

impl Custom {
    /// A rule that fails with its own message.
    pub fn new(f: impl Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static) -> Self {
        Custom(Arc::new(f))
    }

    /// A boolean predicate; `false` fails with `is invalid`.
    pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Custom::new(move |v| {
            if f(v) {
                Ok(())
            } else {
                Err(ValidationError::new("is invalid"))
            }
        })
    }
}

impl Validation for Custom {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        (self.0)(value)
    }
}

impl std::fmt::Debug for Custom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Custom(..)")
    }
}

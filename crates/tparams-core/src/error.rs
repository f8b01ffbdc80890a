//! # Error Types
//!
//! Runtime errors surfaced by the processing stages, plus the narrower
//! errors raised by the type registry and by individual coercers. All
//! errors use `thiserror`.
//!
//! ## Design
//!
//! - Input defects ([`Error::InvalidParameter`], [`Error::UnpermittedParameter`])
//!   always carry the offending [`Path`] and the schema's [`Source`] so the
//!   web layer can build a client-facing response.
//! - Schema authoring defects ([`Error::InvalidMethod`], [`Error::RootDeletion`])
//!   are programmer errors and carry no path.
//! - Coercion failures are a distinct [`CoercionError`] so the coercer can
//!   report the actual and expected types instead of a generic mismatch.

use thiserror::Error;

use crate::path::Path;

/// Logical origin of a schema's input, carried for error reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Request body parameters.
    Params,
    /// Query string parameters.
    Query,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Params => f.write_str("params"),
            Source::Query => f.write_str("query"),
        }
    }
}

/// Top-level runtime error.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A value has the wrong type, failed coercion, or failed a validation.
    #[error("{message}")]
    InvalidParameter {
        message: String,
        path: Path,
        origin: Option<Source>,
    },

    /// A key, index or guarded branch that the schema does not permit.
    #[error("{message}")]
    UnpermittedParameter {
        message: String,
        path: Path,
        origin: Option<Source>,
    },

    /// A guard referenced a predicate that could not be resolved.
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    /// Something attempted to delete the root parameter.
    #[error("cannot delete the root parameter")]
    RootDeletion,

    /// A formatter could not produce its output shape.
    #[error("format error: {0}")]
    Format(String),

    /// A transform renamed a node to a key its parent container cannot
    /// hold, e.g. a name inside an array.
    #[error("invalid key for parent container: {0}")]
    InvalidKey(String),

    /// Type registry failure.
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl Error {
    pub fn invalid(message: impl Into<String>, path: Path, origin: Option<Source>) -> Self {
        Error::InvalidParameter {
            message: message.into(),
            path,
            origin,
        }
    }

    pub fn unpermitted(message: impl Into<String>, path: Path, origin: Option<Source>) -> Self {
        Error::UnpermittedParameter {
            message: message.into(),
            path,
            origin,
        }
    }

    /// Path of the offending input, for input defects.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::InvalidParameter { path, .. } | Error::UnpermittedParameter { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }

    /// Source of the schema that rejected the input, for input defects.
    pub fn origin(&self) -> Option<Source> {
        match self {
            Error::InvalidParameter { origin, .. }
            | Error::UnpermittedParameter { origin, .. } => *origin,
            _ => None,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidParameter { .. } => "invalid_parameter",
            Error::UnpermittedParameter { .. } => "unpermitted_parameter",
            Error::InvalidMethod(_) => "invalid_method",
            Error::RootDeletion => "root_deletion",
            Error::Format(_) => "format",
            Error::InvalidKey(_) => "invalid_key",
            Error::Type(_) => "type",
        }
    }
}

/// Error from the type registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A type with this name is already registered.
    #[error("type is already registered: {0}")]
    Duplicate(String),

    /// No type with this name is registered.
    #[error("invalid type: {0}")]
    Unknown(String),

    /// A subtype names an archetype that is not a registered nominal type.
    #[error("archetype {archetype} of subtype {name} is not a registered type")]
    UnknownArchetype { name: String, archetype: String },

    /// No registered type matches the value.
    #[error("invalid type for value: {0}")]
    NoMatch(String),
}

/// A coercer could not convert its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot coerce {value} to {target}")]
pub struct CoercionError {
    pub value: String,
    pub target: String,
}

impl CoercionError {
    pub fn new(value: impl std::fmt::Display, target: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_expose_path_and_origin() {
        let err = Error::unpermitted("unpermitted parameter", Path::new(["bar"]), Some(Source::Query));
        assert_eq!(err.path().map(Path::to_json_pointer).as_deref(), Some("/bar"));
        assert_eq!(err.origin(), Some(Source::Query));
        assert_eq!(err.kind(), "unpermitted_parameter");
        assert_eq!(err.to_string(), "unpermitted parameter");
    }

    #[test]
    fn test_programmer_errors_have_no_path() {
        let err = Error::InvalidMethod("admin?".into());
        assert!(err.path().is_none());
        assert!(err.origin().is_none());
        assert_eq!(err.to_string(), "invalid method: admin?");
    }

    #[test]
    fn test_type_error_converts() {
        let err: Error = TypeError::Unknown("uuid".into()).into();
        assert_eq!(err.kind(), "type");
        assert_eq!(err.to_string(), "invalid type: uuid");
    }
}

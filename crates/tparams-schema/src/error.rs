//! # Schema Construction Errors
//!
//! Every malformed schema is rejected while it is being built, before any
//! input is processed. These are authoring defects, never input defects.

use thiserror::Error;

use tparams_core::TypeError;

/// Error raised while building a schema or a formatter registry entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A hash schema declared the same key twice.
    #[error("key {0} has already been defined")]
    DuplicateKey(String),

    /// An array schema declared the same index twice.
    #[error("index {0} has already been defined")]
    DuplicateIndex(usize),

    /// An indexed item skipped over undeclared indices.
    #[error("index {index} is out of order (next index is {next})")]
    IndexGap { index: usize, next: usize },

    /// An item was added to an array already marked endless.
    #[error("cannot define item {0} for endless array")]
    EndlessConflict(usize),

    /// `param` was called on a schema whose type is not hash-like.
    #[error("cannot define param for non-hash type (got {0})")]
    NotAHash(String),

    /// `item`/`items` was called on a schema whose type is not array-like.
    #[error("cannot define item for non-array type (got {0})")]
    NotAnArray(String),

    /// A children block was given for a scalar type.
    #[error("type {0} does not accept a block")]
    BodyNotAccepted(String),

    /// `format` was called below the root.
    #[error("cannot define format for child schema")]
    FormatOnChild,

    /// No formatter is registered under this name.
    #[error("invalid format: {0}")]
    UnknownFormat(String),

    /// A formatter with this name is already registered.
    #[error("format is already registered: {0}")]
    DuplicateFormat(String),

    /// A child schema was declared without a type.
    #[error("type is required for {0}")]
    MissingType(String),

    /// The root schema was declared nilable.
    #[error("root cannot be null")]
    RootAllowNil,

    /// An option has the wrong shape.
    #[error("{0}")]
    InvalidOption(String),

    /// Type registry failure (unknown type name).
    #[error(transparent)]
    Type(#[from] TypeError),

    /// A declarative definition document could not be read.
    #[error("invalid schema definition: {0}")]
    Definition(String),
}

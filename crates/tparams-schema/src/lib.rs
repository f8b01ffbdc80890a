//! # tparams-schema — Schema Trees for Typed Params
//!
//! Declares what a request's parameters must look like. A [`Schema`] is an
//! immutable tree built once, either through the [`SchemaBuilder`] API or
//! from a YAML/JSON [`SchemaDef`], and then shared by every request the
//! pipeline processes.
//!
//! ## Node Options (`options`, `schema`)
//!
//! Each node carries a type from the core registry, presence rules
//! (`optional`, `allow_nil`, `allow_blank`), strictness, guards, and the
//! rule objects materialized from its options:
//!
//! - [`validations`]: inclusion, exclusion, format, length, depth and
//!   custom rules, run after presence and type checks.
//! - [`transforms`]: key alias, blank nilification, custom transforms,
//!   key casing and the noop marker, run in that order on output.
//!
//! ## Guards (`guard`)
//!
//! `if`/`unless` guards are closures or named predicates evaluated against
//! a [`Controller`], the single seam to the surrounding web layer.
//!
//! ## Formatters (`formatters`)
//!
//! A root schema may bind an output formatter. `jsonapi` flattens JSON:API
//! documents; `plain` nests output under the controller's resource name.
//!
//! ## Crate Policy
//!
//! - Depends only on `tparams-core` internally.
//! - Every malformed schema is a [`SchemaError`] at build time; processing
//!   never discovers schema defects.

pub mod definition;
pub mod error;
pub mod formatters;
pub mod guard;
pub mod options;
pub mod schema;
pub mod transforms;
pub mod validations;

pub use definition::SchemaDef;
pub use error::SchemaError;
pub use formatters::{FormatContext, Formatter};
pub use guard::{Controller, Guard, NullController};
pub use options::Options;
pub use schema::{Children, Schema, SchemaBuilder};
pub use transforms::Transform;
pub use validations::{Validation, ValidationError};

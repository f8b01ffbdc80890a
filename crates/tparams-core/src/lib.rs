//! # tparams-core — Foundational Types for Typed Params
//!
//! This crate holds the primitives every other `tparams-*` crate builds on.
//! It depends on nothing internal.
//!
//! ## Contents
//!
//! - [`Value`]: the dynamic, ordered tree that untrusted input is parsed
//!   into before it is checked against a schema.
//! - [`Path`]: an addressable location inside a [`Value`] tree, rendered as
//!   a JSON pointer, dot notation, or a human-readable form, with an optional
//!   [`Casing`] applied to named segments.
//! - [`types`]: the process-wide type registry: nominal, abstract and
//!   subtypes, each with a matcher and an optional coercer.
//! - [`Error`]: the runtime error surfaced by every processing stage.
//! - [`Configuration`]: global defaults (nil-optional policy, path casing,
//!   key casing).
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Registries are written at startup and read everywhere else.

pub mod casing;
pub mod config;
pub mod error;
pub mod path;
pub mod types;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use casing::Casing;
pub use config::{config, configure, ConfigError, Configuration};
pub use error::{CoercionError, Error, Source, TypeError};
pub use path::{Path, Segment};
pub use types::{Type, TypeDef};
pub use value::{Key, Value};

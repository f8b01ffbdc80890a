//! # tparams-pipeline — Request Parameter Processing
//!
//! Turns an untrusted input [`Value`](tparams_core::Value) into the shape a
//! [`Schema`](tparams_schema::Schema) promises, or a precise error saying
//! which parameter is wrong and why.
//!
//! ## Stages
//!
//! 1. [`Parameterizer`]: wraps the input into a [`ParamTree`], rejecting or
//!    dropping undeclared keys.
//! 2. [`Bouncer`]: enforces `if`/`unless` guards, top-down.
//! 3. [`Coercer`]: converts values into their declared types.
//! 4. [`Validator`]: presence, nullability, blankness, type and rule checks.
//! 5. [`Transformer`]: renames, nilification, custom transforms, key casing.
//!
//! Stages 2 to 5 are [`Step`]s run in order by the [`Processor`]. Every
//! stage except the bouncer walks the tree post-order through
//! [`depth_first_map`].
//!
//! ## Entry Point
//!
//! ```ignore
//! let out = tparams_pipeline::process(&schema, input, &ProcessOptions::default())?;
//! ```
//!
//! ## Crate Policy
//!
//! - Schemas are shared read-only; every tree borrows its schema.
//! - Processing never mutates global state.

pub mod bouncer;
pub mod coercer;
pub mod mapper;
pub mod parameter;
pub mod parameterizer;
pub mod pipeline;
pub mod transformer;
pub mod validator;

pub use bouncer::Bouncer;
pub use coercer::Coercer;
pub use mapper::depth_first_map;
pub use parameter::{NodeId, ParamTree};
pub use parameterizer::Parameterizer;
pub use pipeline::{process, Format, Pipeline, ProcessOptions, Processor, Step};
pub use transformer::Transformer;
pub use validator::Validator;

//! # Output Formatters
//!
//! A formatter reshapes the fully unwrapped output of a parameter tree,
//! e.g. turning a JSON:API document into flat model attributes. Formatters
//! live in a process-wide registry keyed by name; a root schema binds one
//! with `format(name)`.
//!
//! A formatter may also carry a decorator, invoked with the controller
//! when a schema binding it is built for that controller.
//!
//! Built-ins: [`jsonapi`](self::jsonapi) and [`plain`](self::plain).

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use parking_lot::RwLock;
use tparams_core::{Error, Value};

use crate::error::SchemaError;
use crate::guard::Controller;
use crate::schema::Schema;

mod inflect;
pub mod jsonapi;
pub mod plain;

pub use inflect::{classify, singularize};

/// Everything a formatter may consult besides the value itself.
#[derive(Clone, Copy)]
pub struct FormatContext<'a> {
    /// Root schema of the tree being formatted.
    pub schema: &'a Schema,
    pub controller: Option<&'a dyn Controller>,
}

pub type TransformFn = Arc<dyn Fn(Value, &FormatContext<'_>) -> Result<Value, Error> + Send + Sync>;
pub type DecorateFn = Arc<dyn Fn(&dyn Controller) + Send + Sync>;

/// A named output transform.
#[derive(Clone)]
pub struct Formatter {
    name: String,
    transform: TransformFn,
    decorator: Option<DecorateFn>,
}

impl Formatter {
    pub fn new(
        name: impl Into<String>,
        transform: impl Fn(Value, &FormatContext<'_>) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
            decorator: None,
        }
    }

    pub fn with_decorator(mut self, decorate: impl Fn(&dyn Controller) + Send + Sync + 'static) -> Self {
        self.decorator = Some(Arc::new(decorate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_decorator(&self) -> bool {
        self.decorator.is_some()
    }

    /// Run the decorator, if any, against `controller`.
    pub fn decorate(&self, controller: &dyn Controller) {
        if let Some(decorate) = &self.decorator {
            decorate(controller);
        }
    }

    pub fn call(&self, value: Value, ctx: &FormatContext<'_>) -> Result<Value, Error> {
        (self.transform)(value, ctx)
    }
}

impl std::fmt::Debug for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formatter")
            .field("name", &self.name)
            .field("decorator", &self.decorator.is_some())
            .finish()
    }
}

impl PartialEq for Formatter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

// ─── Process-wide registry ──────────────────────────────────────────

static REGISTRY: OnceLock<RwLock<IndexMap<String, Formatter>>> = OnceLock::new();

fn registry() -> &'static RwLock<IndexMap<String, Formatter>> {
    REGISTRY.get_or_init(|| {
        let builtins = [jsonapi::formatter(), plain::formatter()];
        RwLock::new(
            builtins
                .into_iter()
                .map(|f| (f.name.clone(), f))
                .collect(),
        )
    })
}

/// Register a formatter.
///
/// # Errors
///
/// Returns [`SchemaError::DuplicateFormat`] if the name is taken.
pub fn register(formatter: Formatter) -> Result<Formatter, SchemaError> {
    let mut formats = registry().write();
    if formats.contains_key(&formatter.name) {
        return Err(SchemaError::DuplicateFormat(formatter.name));
    }
    tracing::debug!(name = %formatter.name, "registered formatter");
    formats.insert(formatter.name.clone(), formatter.clone());
    Ok(formatter)
}

/// Remove a formatter.
pub fn unregister(name: &str) -> Option<Formatter> {
    let removed = registry().write().shift_remove(name);
    if removed.is_some() {
        tracing::debug!(name, "unregistered formatter");
    }
    removed
}

/// Look up a formatter.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownFormat`] if nothing is registered under
/// `name`.
pub fn get(name: &str) -> Result<Formatter, SchemaError> {
    registry()
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| SchemaError::UnknownFormat(name.to_string()))
}

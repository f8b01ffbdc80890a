//! # Guards and the Controller Collaborator
//!
//! A guard decides whether a schema branch is permitted for the current
//! request. It is either a closure evaluated against the controller or the
//! name of a zero-argument predicate the controller exposes.
//!
//! The [`Controller`] trait is the whole interface to the web layer: named
//! predicates, the resource name used by the plain formatter, and the hook
//! formatters use to decorate the controller with extra accessors.

use std::sync::Arc;

use tparams_core::Error;

/// The web-layer object a schema is evaluated for.
pub trait Controller {
    /// Evaluate a zero-argument predicate by name. `None` means there is no
    /// such predicate.
    fn predicate(&self, name: &str) -> Option<bool>;

    /// Name of the resource this controller manages, e.g. `users`.
    fn resource_name(&self) -> Option<String> {
        None
    }

    /// Ask the controller to expose an extra accessor on behalf of a
    /// formatter (for example the `meta` accessor of the JSON:API format).
    fn decorate(&self, _format: &str, _accessor: &str) {}
}

/// Stand-in used when no controller is supplied: it knows no predicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullController;

impl Controller for NullController {
    fn predicate(&self, _name: &str) -> Option<bool> {
        None
    }
}

/// Closure form of a guard.
pub type GuardFn = Arc<dyn Fn(&dyn Controller) -> bool + Send + Sync>;

/// An `if`/`unless` predicate reference.
#[derive(Clone)]
pub enum Guard {
    /// Evaluated with the controller as context.
    Callable(GuardFn),
    /// Looked up as a predicate on the controller.
    Named(String),
}

impl Guard {
    pub fn callable(f: impl Fn(&dyn Controller) -> bool + Send + Sync + 'static) -> Self {
        Guard::Callable(Arc::new(f))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Guard::Named(name.into())
    }

    /// Evaluate the guard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMethod`] when a named guard cannot be resolved
    /// on the controller (or there is no controller).
    pub fn evaluate(&self, controller: Option<&dyn Controller>) -> Result<bool, Error> {
        match self {
            Guard::Callable(f) => Ok(f(controller.unwrap_or(&NullController))),
            Guard::Named(name) => controller
                .and_then(|c| c.predicate(name))
                .ok_or_else(|| Error::InvalidMethod(format!("{name} is not a predicate method"))),
        }
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Guard::Callable(_) => f.write_str("Guard::Callable(..)"),
            Guard::Named(name) => write!(f, "Guard::Named({name:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Admin;

    impl Controller for Admin {
        fn predicate(&self, name: &str) -> Option<bool> {
            match name {
                "admin" => Some(true),
                "guest" => Some(false),
                _ => None,
            }
        }
    }

    #[test]
    fn test_callable_without_controller() {
        assert_eq!(Guard::callable(|_| false).evaluate(None).unwrap(), false);
        assert_eq!(Guard::callable(|_| true).evaluate(None).unwrap(), true);
    }

    #[test]
    fn test_callable_sees_controller() {
        let guard = Guard::callable(|c| c.predicate("admin").unwrap_or(false));
        assert!(guard.evaluate(Some(&Admin)).unwrap());
        assert!(!guard.evaluate(None).unwrap());
    }

    #[test]
    fn test_named_resolves_on_controller() {
        assert!(Guard::named("admin").evaluate(Some(&Admin)).unwrap());
        assert!(!Guard::named("guest").evaluate(Some(&Admin)).unwrap());
    }

    #[test]
    fn test_unresolvable_named_guard() {
        let err = Guard::named("owner").evaluate(Some(&Admin)).unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(_)));
        let err = Guard::named("admin").evaluate(None).unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(_)));
    }
}

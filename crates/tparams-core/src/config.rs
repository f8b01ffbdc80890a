//! Global configuration.
//!
//! Defaults consumed read-only by schema construction and the processing
//! stages. A process-wide copy lives behind [`config`]/[`configure`];
//! every stage also accepts an explicit [`Configuration`], so callers that
//! need different behaviour per call never have to touch global state.

use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::casing::{Casing, UnknownCasing};

/// Processing defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Configuration {
    /// Drop `nil` optional parameters during transformation, and accept them
    /// during validation, instead of rejecting them.
    pub ignore_nil_optionals: bool,
    /// Casing applied when rendering error paths.
    pub path_casing: Option<Casing>,
    /// Casing applied to every schema key unless overridden per node.
    pub key_casing: Option<Casing>,
}

impl Configuration {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TPARAMS_IGNORE_NIL_OPTIONALS` (default: `false`)
    /// - `TPARAMS_PATH_CASING` (default: none)
    /// - `TPARAMS_KEY_CASING` (default: none)
    ///
    /// Casings are one of `underscore`, `camel`, `lower_camel`, `dash` or
    /// `none`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            ignore_nil_optionals: env_bool("TPARAMS_IGNORE_NIL_OPTIONALS")?,
            path_casing: env_casing("TPARAMS_PATH_CASING")?,
            key_casing: env_casing("TPARAMS_KEY_CASING")?,
        })
    }

    pub fn with_ignore_nil_optionals(mut self, ignore: bool) -> Self {
        self.ignore_nil_optionals = ignore;
        self
    }

    pub fn with_path_casing(mut self, casing: Option<Casing>) -> Self {
        self.path_casing = casing;
        self
    }

    pub fn with_key_casing(mut self, casing: Option<Casing>) -> Self {
        self.key_casing = casing;
        self
    }
}

fn env_bool(var: &str) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(false),
        Ok(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool(var.to_string(), raw)),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Some(false),
        "1" | "true" | "yes" | "on" => Some(true),
        _ => None,
    }
}

fn env_casing(var: &str) -> Result<Option<Casing>, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(None),
        Ok(raw) => {
            Casing::parse_opt(&raw).map_err(|e| ConfigError::InvalidCasing(var.to_string(), e))
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid boolean for {0}: {1:?}")]
    InvalidBool(String, String),
    #[error("invalid casing for {0}: {1}")]
    InvalidCasing(String, UnknownCasing),
}

static GLOBAL: OnceLock<RwLock<Configuration>> = OnceLock::new();

fn global() -> &'static RwLock<Configuration> {
    GLOBAL.get_or_init(|| RwLock::new(Configuration::default()))
}

/// Snapshot of the process-wide configuration.
pub fn config() -> Configuration {
    *global().read()
}

/// Update the process-wide configuration in place.
pub fn configure(f: impl FnOnce(&mut Configuration)) {
    let mut guard = global().write();
    f(&mut guard);
    tracing::debug!(config = ?*guard, "configuration updated");
}

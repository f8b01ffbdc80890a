//! # Key Casing
//!
//! Casing policies applied to named keys, both when rendering a [`Path`]
//! and when renaming keys during transformation. Every policy first
//! normalizes the input to snake case, so converting `parentKey` to
//! `underscore` and back to `lower_camel` round-trips.
//!
//! [`Path`]: crate::Path

use std::str::FromStr;

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// A key casing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    /// `foo_bar`
    Underscore,
    /// `FooBar`
    Camel,
    /// `fooBar`
    LowerCamel,
    /// `foo-bar`
    Dash,
}

impl Casing {
    /// Apply the policy to a single key.
    pub fn apply(self, s: &str) -> String {
        match self {
            Casing::Underscore => s.to_snake_case(),
            Casing::Camel => s.to_snake_case().to_upper_camel_case(),
            Casing::LowerCamel => s.to_snake_case().to_lower_camel_case(),
            Casing::Dash => s.to_snake_case().to_kebab_case(),
        }
    }

    /// Apply an optional policy; `None` leaves the key untouched.
    pub fn apply_opt(casing: Option<Casing>, s: &str) -> String {
        match casing {
            Some(c) => c.apply(s),
            None => s.to_string(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Casing::Underscore => "underscore",
            Casing::Camel => "camel",
            Casing::LowerCamel => "lower_camel",
            Casing::Dash => "dash",
        }
    }

    /// Parse an optional policy, where `none` (or an empty string) means no
    /// casing.
    pub fn parse_opt(s: &str) -> Result<Option<Casing>, UnknownCasing> {
        match s.trim() {
            "" | "none" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl std::fmt::Display for Casing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognized casing name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown casing {0:?} (expected underscore, camel, lower_camel, dash or none)")]
pub struct UnknownCasing(pub String);

impl FromStr for Casing {
    type Err = UnknownCasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "underscore" | "snake" => Ok(Casing::Underscore),
            "camel" => Ok(Casing::Camel),
            "lower_camel" | "lowerCamel" => Ok(Casing::LowerCamel),
            "dash" | "kebab" => Ok(Casing::Dash),
            other => Err(UnknownCasing(other.to_string())),
        }
    }
}

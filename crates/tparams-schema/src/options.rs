//! Per-node schema options.
//!
//! Every keyword a schema node accepts is an `Option` field here, so a set
//! of `with` defaults can be merged field by field underneath the options
//! given explicitly to `param`/`item`.

use std::sync::Arc;

use regex::Regex;
use tparams_core::{Casing, Key, Source, Value};

use crate::guard::{Controller, Guard};
use crate::schema::SchemaBuilder;
use crate::transforms;
use crate::validations::{self, FormatRule, LengthRule, Membership, ValidationError};

/// Body of a container schema.
pub type ChildrenFn = Arc<dyn Fn(&mut SchemaBuilder<'_>) + Send + Sync>;

/// Options for one schema node.
#[derive(Clone, Default)]
pub struct Options {
    pub(crate) ty: Option<String>,
    pub(crate) strict: Option<bool>,
    pub(crate) optional: Option<bool>,
    pub(crate) coerce: Option<bool>,
    pub(crate) polymorphic: Option<bool>,
    pub(crate) allow_blank: Option<bool>,
    pub(crate) allow_nil: Option<bool>,
    pub(crate) allow_non_scalars: Option<bool>,
    pub(crate) nilify_blanks: Option<bool>,
    pub(crate) noop: Option<bool>,
    pub(crate) source: Option<Option<Source>>,
    pub(crate) casing: Option<Option<Casing>>,
    pub(crate) inclusion: Option<Membership>,
    pub(crate) exclusion: Option<Membership>,
    pub(crate) format: Option<FormatRule>,
    pub(crate) length: Option<LengthRule>,
    pub(crate) depth: Option<usize>,
    pub(crate) validate: Option<validations::Custom>,
    pub(crate) transform: Option<transforms::Custom>,
    pub(crate) if_guard: Option<Guard>,
    pub(crate) unless_guard: Option<Guard>,
    pub(crate) as_key: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) children: Option<ChildrenFn>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options declaring the node's type.
    pub fn of(ty: impl Into<String>) -> Self {
        Self::new().ty(ty)
    }

    pub fn ty(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Shorthand for `strict(false)`.
    pub fn lenient(self) -> Self {
        self.strict(false)
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn coerce(mut self, coerce: bool) -> Self {
        self.coerce = Some(coerce);
        self
    }

    pub fn polymorphic(mut self, polymorphic: bool) -> Self {
        self.polymorphic = Some(polymorphic);
        self
    }

    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = Some(allow);
        self
    }

    pub fn allow_nil(mut self, allow: bool) -> Self {
        self.allow_nil = Some(allow);
        self
    }

    pub fn allow_non_scalars(mut self, allow: bool) -> Self {
        self.allow_non_scalars = Some(allow);
        self
    }

    pub fn nilify_blanks(mut self, nilify: bool) -> Self {
        self.nilify_blanks = Some(nilify);
        self
    }

    pub fn noop(mut self, noop: bool) -> Self {
        self.noop = Some(noop);
        self
    }

    pub fn source(mut self, source: Option<Source>) -> Self {
        self.source = Some(source);
        self
    }

    /// Key casing for this node; `None` disables casing even when a
    /// default is configured.
    pub fn casing(mut self, casing: Option<Casing>) -> Self {
        self.casing = Some(casing);
        self
    }

    pub fn inclusion(mut self, set: Membership) -> Self {
        self.inclusion = Some(set);
        self
    }

    /// Inclusion in an explicit list of values.
    pub fn one_of<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        self.inclusion(Membership::Values(values.into_iter().map(Into::into).collect()))
    }

    pub fn exclusion(mut self, set: Membership) -> Self {
        self.exclusion = Some(set);
        self
    }

    /// Exclusion of an explicit list of values.
    pub fn none_of<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        self.exclusion(Membership::Values(values.into_iter().map(Into::into).collect()))
    }

    pub fn format(mut self, rule: FormatRule) -> Self {
        self.format = Some(rule);
        self
    }

    pub fn matching(self, rx: Regex) -> Self {
        self.format(FormatRule::With(rx))
    }

    pub fn not_matching(self, rx: Regex) -> Self {
        self.format(FormatRule::Without(rx))
    }

    pub fn length(mut self, rule: LengthRule) -> Self {
        self.length = Some(rule);
        self
    }

    pub fn max_depth(mut self, maximum: usize) -> Self {
        self.depth = Some(maximum);
        self
    }

    /// Custom validation failing with `is invalid` when `f` returns false.
    pub fn validate(mut self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validate = Some(validations::Custom::predicate(f));
        self
    }

    /// Custom validation that supplies its own error.
    pub fn validate_with(
        mut self,
        f: impl Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(validations::Custom::new(f));
        self
    }

    pub fn transform(
        mut self,
        f: impl Fn(Key, Value) -> (Option<Key>, Value) + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(transforms::Custom::new(f));
        self
    }

    pub fn if_guard(mut self, guard: Guard) -> Self {
        self.if_guard = Some(guard);
        self
    }

    /// `if:` guard from a closure.
    pub fn when(self, f: impl Fn(&dyn Controller) -> bool + Send + Sync + 'static) -> Self {
        self.if_guard(Guard::callable(f))
    }

    pub fn unless_guard(mut self, guard: Guard) -> Self {
        self.unless_guard = Some(guard);
        self
    }

    /// `unless:` guard from a closure.
    pub fn unless(self, f: impl Fn(&dyn Controller) -> bool + Send + Sync + 'static) -> Self {
        self.unless_guard(Guard::callable(f))
    }

    /// Rename the node on output (`as:`).
    pub fn as_key(mut self, key: impl Into<String>) -> Self {
        self.as_key = Some(key.into());
        self
    }

    /// Alternative name a formatter may use to find this node.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Declare the node's children. Only container types accept a body.
    pub fn children(mut self, f: impl Fn(&mut SchemaBuilder<'_>) + Send + Sync + 'static) -> Self {
        self.children = Some(Arc::new(f));
        self
    }

    /// Fill every unset field from `defaults`.
    pub(crate) fn or(self, defaults: &Options) -> Options {
        let d = defaults.clone();
        Options {
            ty: self.ty.or(d.ty),
            strict: self.strict.or(d.strict),
            optional: self.optional.or(d.optional),
            coerce: self.coerce.or(d.coerce),
            polymorphic: self.polymorphic.or(d.polymorphic),
            allow_blank: self.allow_blank.or(d.allow_blank),
            allow_nil: self.allow_nil.or(d.allow_nil),
            allow_non_scalars: self.allow_non_scalars.or(d.allow_non_scalars),
            nilify_blanks: self.nilify_blanks.or(d.nilify_blanks),
            noop: self.noop.or(d.noop),
            source: self.source.or(d.source),
            casing: self.casing.or(d.casing),
            inclusion: self.inclusion.or(d.inclusion),
            exclusion: self.exclusion.or(d.exclusion),
            format: self.format.or(d.format),
            length: self.length.or(d.length),
            depth: self.depth.or(d.depth),
            validate: self.validate.or(d.validate),
            transform: self.transform.or(d.transform),
            if_guard: self.if_guard.or(d.if_guard),
            unless_guard: self.unless_guard.or(d.unless_guard),
            as_key: self.as_key.or(d.as_key),
            alias: self.alias.or(d.alias),
            children: self.children.or(d.children),
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("type", &self.ty)
            .field("strict", &self.strict)
            .field("optional", &self.optional)
            .field("children", &self.children.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_options_win_over_defaults() {
        let defaults = Options::new().optional(true).allow_nil(true);
        let merged = Options::of("string").optional(false).or(&defaults);
        assert_eq!(merged.ty.as_deref(), Some("string"));
        assert_eq!(merged.optional, Some(false));
        assert_eq!(merged.allow_nil, Some(true));
        assert_eq!(merged.strict, None);
    }

    #[test]
    fn test_explicit_none_casing_is_kept() {
        let defaults = Options::new().casing(Some(Casing::Dash));
        let merged = Options::new().casing(None).or(&defaults);
        assert_eq!(merged.casing, Some(None));
    }
}

//! # Schema Trees
//!
//! A [`Schema`] describes one position in the expected input: its type,
//! whether it may be missing, nil or blank, the guards that gate it, the
//! validations its value must pass, and the transforms applied on output.
//! Container nodes hold ordered children.
//!
//! ## Construction
//!
//! Schemas are built from [`Options`]. A container node declares its
//! children in a body closure receiving a [`SchemaBuilder`]:
//!
//! ```ignore
//! let schema = Schema::build(Options::of("hash").children(|s| {
//!     s.param("name", Options::of("string"));
//!     s.param("tags", Options::of("array").optional(true).children(|s| {
//!         s.items(Options::of("string"));
//!     }));
//! }))?;
//! ```
//!
//! Every malformed declaration is reported as a [`SchemaError`] from
//! `build`; nothing is checked lazily.
//!
//! ## Inheritance
//!
//! Children inherit `strict`, `source` and `casing` from their parent
//! unless set explicitly. The root defaults `casing` to the configured key
//! casing, is always `allow_blank`, and may never be `allow_nil`.
//!
//! ## Declared versus untyped bodies
//!
//! A container built with a body has declared children (possibly none);
//! one built without a body has an untyped body, `children() == None`, and
//! accepts any content of its type.

use std::sync::Arc;

use indexmap::IndexMap;
use tparams_core::{types, Casing, Configuration, Key, Path, Source, Type};

use crate::error::SchemaError;
use crate::formatters::{self, Formatter};
use crate::guard::{Controller, Guard};
use crate::options::Options;
use crate::transforms::{KeyAlias, KeyCasing, NilifyBlanks, Noop, Transform};
use crate::validations::{Depth, Exclusion, Format, Inclusion, Length, Validation};

/// Declared children of a container schema.
#[derive(Clone)]
pub enum Children {
    Hash(IndexMap<String, Schema>),
    Array(Vec<Schema>),
}

impl Children {
    pub fn len(&self) -> usize {
        match self {
            Children::Hash(h) => h.len(),
            Children::Array(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Children in declaration order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Schema> + '_> {
        match self {
            Children::Hash(h) => Box::new(h.values()),
            Children::Array(a) => Box::new(a.iter()),
        }
    }
}

/// An immutable schema node.
#[derive(Clone)]
pub struct Schema {
    ty: Type,
    key: Key,
    path: Path,
    children: Option<Children>,
    strict: bool,
    optional: bool,
    coerce: bool,
    polymorphic: bool,
    allow_blank: bool,
    allow_nil: bool,
    allow_non_scalars: bool,
    endless: bool,
    source: Option<Source>,
    casing: Option<Casing>,
    if_guard: Option<Guard>,
    unless_guard: Option<Guard>,
    as_key: Option<String>,
    alias: Option<String>,
    validations: Vec<Arc<dyn Validation>>,
    transforms: Vec<Arc<dyn Transform>>,
    formatter: Option<Formatter>,
}

impl Schema {
    /// Build a root schema with the process-wide configuration.
    pub fn build(options: Options) -> Result<Schema, SchemaError> {
        Self::build_with(options, None, &tparams_core::config())
    }

    /// Build a root schema for a controller. Formatters bound with
    /// `format` decorate the controller.
    pub fn build_for(options: Options, controller: &dyn Controller) -> Result<Schema, SchemaError> {
        Self::build_with(options, Some(controller), &tparams_core::config())
    }

    /// Build a root schema with explicit collaborators.
    pub fn build_with(
        options: Options,
        controller: Option<&dyn Controller>,
        config: &Configuration,
    ) -> Result<Schema, SchemaError> {
        let options = Options {
            ty: options.ty.clone().or_else(|| Some("hash".to_string())),
            ..options
        };
        Self::construct(Key::Root, Path::root(), options, controller, config)
    }

    fn construct(
        key: Key,
        path: Path,
        options: Options,
        controller: Option<&dyn Controller>,
        config: &Configuration,
    ) -> Result<Schema, SchemaError> {
        let name = options
            .ty
            .clone()
            .ok_or_else(|| SchemaError::MissingType(key.to_string()))?;
        let ty = types::get(&name)?;

        let root = key.is_root();
        let allow_nil = options.allow_nil.unwrap_or(false);
        if root && allow_nil {
            return Err(SchemaError::RootAllowNil);
        }

        let casing = options.casing.unwrap_or(config.key_casing);

        let mut validations: Vec<Arc<dyn Validation>> = Vec::new();
        if let Some(set) = options.inclusion.clone() {
            validations.push(Arc::new(Inclusion(set)));
        }
        if let Some(set) = options.exclusion.clone() {
            validations.push(Arc::new(Exclusion(set)));
        }
        if let Some(rule) = options.format.clone() {
            validations.push(Arc::new(Format(rule)));
        }
        if let Some(rule) = options.length.clone() {
            validations.push(Arc::new(Length(rule)));
        }
        if let Some(maximum) = options.depth {
            validations.push(Arc::new(Depth { maximum }));
        }
        if let Some(custom) = options.validate.clone() {
            validations.push(Arc::new(custom));
        }

        let mut transforms: Vec<Arc<dyn Transform>> = Vec::new();
        if let Some(as_key) = options.as_key.clone() {
            transforms.push(Arc::new(KeyAlias(as_key)));
        }
        if options.nilify_blanks.unwrap_or(false) {
            transforms.push(Arc::new(NilifyBlanks));
        }
        if let Some(custom) = options.transform.clone() {
            transforms.push(Arc::new(custom));
        }
        if let Some(casing) = casing {
            transforms.push(Arc::new(KeyCasing(casing)));
        }
        if options.noop.unwrap_or(false) {
            transforms.push(Arc::new(Noop));
        }

        let mut schema = Schema {
            coerce: options.coerce.unwrap_or(false) && ty.is_coercible(),
            ty,
            key,
            path,
            children: None,
            strict: options.strict.unwrap_or(true),
            optional: options.optional.unwrap_or(false),
            polymorphic: options.polymorphic.unwrap_or(false),
            allow_blank: root || options.allow_blank.unwrap_or(false),
            allow_nil,
            allow_non_scalars: options.allow_non_scalars.unwrap_or(false),
            endless: false,
            source: options.source.unwrap_or(None),
            casing,
            if_guard: options.if_guard.clone(),
            unless_guard: options.unless_guard.clone(),
            as_key: options.as_key.clone(),
            alias: options.alias.clone(),
            validations,
            transforms,
            formatter: None,
        };

        if let Some(body) = options.children {
            if !schema.ty.accepts_block() {
                return Err(SchemaError::BodyNotAccepted(schema.ty.name().to_string()));
            }
            schema.children = Some(if schema.ty.is_array() {
                Children::Array(Vec::new())
            } else {
                Children::Hash(IndexMap::new())
            });

            let mut builder = SchemaBuilder {
                schema,
                defaults: Options::default(),
                controller,
                config: *config,
                error: None,
            };
            body(&mut builder);
            if let Some(err) = builder.error {
                return Err(err);
            }
            schema = builder.schema;
        }

        Ok(schema)
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Location of this node in the schema tree.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared children, or `None` for scalars and untyped bodies.
    pub fn children(&self) -> Option<&Children> {
        self.children.as_ref()
    }

    /// Whether at least one child is declared.
    pub fn has_children(&self) -> bool {
        self.children.as_ref().map_or(false, |c| !c.is_empty())
    }

    /// Keys of the declared children.
    pub fn keys(&self) -> Vec<Key> {
        match &self.children {
            Some(Children::Hash(h)) => h.keys().map(|k| Key::Name(k.clone())).collect(),
            Some(Children::Array(a)) => (0..a.len()).map(Key::Index).collect(),
            None => Vec::new(),
        }
    }

    /// The child schema governing `key`. For endless arrays every index
    /// maps to the single declared item.
    pub fn child(&self, key: &Key) -> Option<&Schema> {
        match (&self.children, key) {
            (Some(Children::Hash(h)), Key::Name(name)) => h.get(name),
            (Some(Children::Array(a)), Key::Index(i)) => {
                if self.endless {
                    a.first()
                } else {
                    a.get(*i)
                }
            }
            _ => None,
        }
    }

    /// A hash child declared as `name`, or renamed/aliased to `name`.
    pub fn child_named(&self, name: &str) -> Option<&Schema> {
        match &self.children {
            Some(Children::Hash(h)) => h.get(name).or_else(|| {
                h.values().find(|c| {
                    c.as_key.as_deref() == Some(name) || c.alias.as_deref() == Some(name)
                })
            }),
            _ => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.key.is_root()
    }

    pub fn is_child(&self) -> bool {
        !self.is_root()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_lenient(&self) -> bool {
        !self.strict
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_required(&self) -> bool {
        !self.optional
    }

    /// Whether the coercer stage converts this node's value.
    pub fn coerces(&self) -> bool {
        self.coerce
    }

    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    pub fn allows_blank(&self) -> bool {
        self.allow_blank
    }

    pub fn allows_nil(&self) -> bool {
        self.allow_nil
    }

    pub fn allows_non_scalars(&self) -> bool {
        self.allow_non_scalars
    }

    pub fn is_endless(&self) -> bool {
        self.endless
    }

    pub fn is_indexed(&self) -> bool {
        !self.endless
    }

    pub fn is_array(&self) -> bool {
        self.ty.is_array()
    }

    pub fn is_hash(&self) -> bool {
        self.ty.is_hash()
    }

    pub fn is_scalar(&self) -> bool {
        self.ty.is_scalar()
    }

    pub fn source(&self) -> Option<Source> {
        self.source
    }

    pub fn casing(&self) -> Option<Casing> {
        self.casing
    }

    pub fn if_guard(&self) -> Option<&Guard> {
        self.if_guard.as_ref()
    }

    pub fn unless_guard(&self) -> Option<&Guard> {
        self.unless_guard.as_ref()
    }

    pub fn as_key(&self) -> Option<&str> {
        self.as_key.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn validations(&self) -> &[Arc<dyn Validation>] {
        &self.validations
    }

    pub fn transforms(&self) -> &[Arc<dyn Transform>] {
        &self.transforms
    }

    pub fn formatter(&self) -> Option<&Formatter> {
        self.formatter.as_ref()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("Schema");
        d.field("key", &self.key).field("type", &self.ty.name());
        match &self.children {
            Some(Children::Hash(h)) => d.field("children", h),
            Some(Children::Array(a)) => d.field("children", a),
            None => d.field("children", &Option::<()>::None),
        };
        d.finish_non_exhaustive()
    }
}

/// Declares the children of a container schema.
///
/// Builder methods record the first error and ignore later calls; the
/// error is returned from the enclosing `Schema::build`.
pub struct SchemaBuilder<'c> {
    schema: Schema,
    defaults: Options,
    controller: Option<&'c dyn Controller>,
    config: Configuration,
    error: Option<SchemaError>,
}

impl SchemaBuilder<'_> {
    /// The node whose children are being declared.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declare a named child of a hash schema.
    pub fn param(&mut self, key: impl Into<String>, options: Options) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        let key = key.into();
        let result = match &self.schema.children {
            Some(Children::Hash(h)) if h.contains_key(&key) => Err(SchemaError::DuplicateKey(key.clone())),
            Some(Children::Hash(_)) => self.child(Key::Name(key.clone()), options),
            _ => Err(SchemaError::NotAHash(self.schema.ty.name().to_string())),
        };
        match result {
            Ok(child) => {
                if let Some(Children::Hash(h)) = &mut self.schema.children {
                    h.insert(key, child);
                }
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Declare several like-shaped named children.
    pub fn params<K: Into<String>>(&mut self, keys: impl IntoIterator<Item = K>, options: Options) -> &mut Self {
        for key in keys {
            self.param(key, options.clone());
        }
        self
    }

    /// Declare the next indexed child of an array schema.
    pub fn item(&mut self, options: Options) -> &mut Self {
        let next = match &self.schema.children {
            Some(Children::Array(a)) => a.len(),
            _ => 0,
        };
        self.item_at(next, options)
    }

    /// Declare the child at `index` of an array schema. Indices must be
    /// declared in order.
    pub fn item_at(&mut self, index: usize, options: Options) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        let result = match &self.schema.children {
            Some(Children::Array(_)) if self.schema.endless => Err(SchemaError::EndlessConflict(index)),
            Some(Children::Array(a)) if index < a.len() => Err(SchemaError::DuplicateIndex(index)),
            Some(Children::Array(a)) if index > a.len() => Err(SchemaError::IndexGap {
                index,
                next: a.len(),
            }),
            Some(Children::Array(_)) => self.child(Key::Index(index), options),
            _ => Err(SchemaError::NotAnArray(self.schema.ty.name().to_string())),
        };
        match result {
            Ok(child) => {
                if let Some(Children::Array(a)) = &mut self.schema.children {
                    a.push(child);
                }
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Declare the schema of every element and mark the array endless.
    pub fn items(&mut self, options: Options) -> &mut Self {
        self.item_at(0, options);
        if self.error.is_none() {
            self.schema.endless = true;
        }
        self
    }

    /// Apply `defaults` to every direct child declared inside `body`.
    pub fn with(&mut self, defaults: Options, body: impl FnOnce(&mut Self)) -> &mut Self {
        let outer = std::mem::replace(&mut self.defaults, defaults);
        body(self);
        self.defaults = outer;
        self
    }

    /// Bind an output formatter. Only legal on the root.
    pub fn format(&mut self, name: &str) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.schema.is_child() {
            self.error = Some(SchemaError::FormatOnChild);
            return self;
        }
        match formatters::get(name) {
            Ok(formatter) => {
                if let Some(controller) = self.controller {
                    formatter.decorate(controller);
                }
                self.schema.formatter = Some(formatter);
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    fn child(&self, key: Key, options: Options) -> Result<Schema, SchemaError> {
        let options = options.or(&self.defaults);
        let options = Options {
            strict: options.strict.or(Some(self.schema.strict)),
            source: options.source.or(Some(self.schema.source)),
            casing: options.casing.or(Some(self.schema.casing)),
            ..options
        };
        let path = self.schema.path.join(&key);
        Schema::construct(key, path, options, self.controller, &self.config)
    }
}

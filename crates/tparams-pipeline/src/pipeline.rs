//! # Pipeline and Processor
//!
//! A [`Pipeline`] runs an ordered list of [`Step`]s over one parameter
//! tree, stopping at the first error. The [`Processor`] is the standard
//! pipeline: bouncer, coercer, validator, transformer.
//!
//! [`process`] is the one-call entry point: wrap the input, run the
//! processor, unwrap the result through the selected formatter.

use tparams_core::{Configuration, Error, Value};
use tparams_schema::{formatters, Controller, Formatter, Schema};

use crate::bouncer::Bouncer;
use crate::coercer::Coercer;
use crate::parameter::ParamTree;
use crate::parameterizer::Parameterizer;
use crate::transformer::Transformer;
use crate::validator::Validator;

/// One stage of processing.
pub trait Step {
    /// Stage name, used in logs.
    fn name(&self) -> &'static str;

    fn call(&self, tree: &mut ParamTree<'_>) -> Result<(), Error>;
}

/// An ordered list of steps.
#[derive(Default)]
pub struct Pipeline<'a> {
    steps: Vec<Box<dyn Step + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(mut self, step: impl Step + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// Returns the first error any step produces; later steps do not run.
    pub fn call(&self, tree: &mut ParamTree<'_>) -> Result<(), Error> {
        for step in &self.steps {
            tracing::trace!(step = step.name(), "running pipeline step");
            step.call(tree).map_err(|err| {
                tracing::debug!(step = step.name(), error = %err, "pipeline step failed");
                err
            })?;
        }
        Ok(())
    }
}

/// The standard processing pipeline for one schema.
pub struct Processor<'a> {
    schema: &'a Schema,
    config: Configuration,
    pipeline: Pipeline<'a>,
}

impl<'a> Processor<'a> {
    pub fn new(schema: &'a Schema, config: Configuration, controller: Option<&'a dyn Controller>) -> Self {
        let pipeline = Pipeline::new()
            .push(Bouncer::new(controller))
            .push(Coercer::new())
            .push(Validator::new(config))
            .push(Transformer::new(config));
        Self {
            schema,
            config,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &Pipeline<'a> {
        &self.pipeline
    }

    /// Process a tree in place. `None` stands for an absent input, which
    /// only passes when the root schema is optional.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage.
    pub fn call(&self, tree: Option<&mut ParamTree<'_>>) -> Result<(), Error> {
        match tree {
            Some(tree) => self.pipeline.call(tree),
            None => Validator::new(self.config).validate_missing_root(self.schema),
        }
    }
}

/// Which formatter [`process`] applies to the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Format {
    /// The formatter bound on the root schema, if any.
    #[default]
    Auto,
    /// The raw unwrapped shape.
    None,
    /// A registered formatter by name.
    Named(String),
}

impl Format {
    /// Parse a CLI-style selector: `auto`, `none`, or a formatter name.
    pub fn parse(s: &str) -> Self {
        match s {
            "auto" => Format::Auto,
            "none" => Format::None,
            name => Format::Named(name.to_string()),
        }
    }

    fn resolve(&self, schema: &Schema) -> Result<Option<Formatter>, Error> {
        match self {
            Format::Auto => Ok(schema.formatter().cloned()),
            Format::None => Ok(None),
            Format::Named(name) => formatters::get(name)
                .map(Some)
                .map_err(|e| Error::Format(e.to_string())),
        }
    }
}

static AUTO: Format = Format::Auto;

/// Collaborators for [`process`].
#[derive(Clone, Copy)]
pub struct ProcessOptions<'a> {
    pub config: Configuration,
    pub controller: Option<&'a dyn Controller>,
    pub format: &'a Format,
}

impl Default for ProcessOptions<'_> {
    fn default() -> Self {
        Self {
            config: tparams_core::config(),
            controller: None,
            format: &AUTO,
        }
    }
}

/// Parameterize, process and unwrap `value` against `schema`.
///
/// Returns `None` when the input is `nil` and the root schema is optional.
///
/// # Errors
///
/// Returns [`Error::Format`] for an unknown formatter name, and any error
/// raised while wrapping, processing or formatting.
pub fn process(schema: &Schema, value: Value, options: &ProcessOptions<'_>) -> Result<Option<Value>, Error> {
    let formatter = options.format.resolve(schema)?;
    let processor = Processor::new(schema, options.config, options.controller);

    let Some(mut tree) = Parameterizer::with_config(schema, options.config).call(value)? else {
        processor.call(None)?;
        return Ok(None);
    };
    processor.call(Some(&mut tree))?;
    tree.unwrap_with(formatter.as_ref(), options.controller).map(Some)
}

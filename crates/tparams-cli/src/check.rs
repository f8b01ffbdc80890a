//! # Check Subcommand
//!
//! Processes one input document against a schema definition and prints
//! the result as pretty JSON.
//!
//! A rejected input is not an operational failure: the parameter error is
//! printed as a JSON object on stdout and the command exits with `1`.
//!
//! ```json
//! { "error": "is missing", "kind": "invalid_parameter",
//!   "path": "address.street", "pointer": "/address/street", "source": null }
//! ```

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use tparams_core::{Casing, Configuration, Error, Value};
use tparams_pipeline::{process, Format, ProcessOptions};
use tparams_schema::{Controller, SchemaDef};

/// Arguments for the `tparams check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Schema definition (YAML, or JSON with a `.json` extension).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Input document (JSON, or YAML with a `.yaml`/`.yml` extension).
    /// Read from stdin when omitted.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output formatter: `auto` (the schema's own), `none`, or a name.
    #[arg(long, default_value = "auto")]
    pub format: String,

    /// Drop nil optional parameters instead of rejecting them.
    #[arg(long)]
    pub ignore_nil_optionals: bool,

    /// Casing for error paths (underscore, camel, lower_camel, dash, none).
    #[arg(long)]
    pub path_casing: Option<String>,

    /// Default casing for output keys.
    #[arg(long)]
    pub key_casing: Option<String>,

    /// Predicate that named `if`/`unless` guards see as true. Repeatable;
    /// every other predicate is false.
    #[arg(long = "grant", value_name = "PREDICATE")]
    pub grants: Vec<String>,

    /// Resource name used by the `plain` formatter, e.g. `users`.
    #[arg(long)]
    pub resource: Option<String>,
}

/// Controller standing in for the web layer on the command line.
#[derive(Debug, Default)]
struct CliController {
    grants: Vec<String>,
    resource: Option<String>,
}

impl Controller for CliController {
    fn predicate(&self, name: &str) -> Option<bool> {
        Some(self.grants.iter().any(|g| g == name))
    }

    fn resource_name(&self) -> Option<String> {
        self.resource.clone()
    }
}

/// Execute the check subcommand, writing the result to `out`.
///
/// Returns exit code: 0 when accepted, 1 when rejected with a parameter
/// error. Operational failures are returned as errors.
pub fn run_check(args: &CheckArgs, out: &mut impl Write) -> Result<u8> {
    let config = configuration(args)?;
    let controller = CliController {
        grants: args.grants.clone(),
        resource: args.resource.clone(),
    };

    let def = SchemaDef::from_path(&args.schema)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    let schema = def.build(Some(&controller), &config).context("invalid schema definition")?;

    let input = match &args.input {
        Some(path) => read_input(path)?,
        None => {
            let mut src = String::new();
            std::io::stdin()
                .read_to_string(&mut src)
                .context("failed to read stdin")?;
            parse_input(&src, false)?
        }
    };

    let format = Format::parse(&args.format);
    let options = ProcessOptions {
        config,
        controller: Some(&controller),
        format: &format,
    };

    match process(&schema, input, &options) {
        Ok(value) => {
            let json = value.map_or(serde_json::Value::Null, |v| v.to_json());
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
            Ok(0)
        }
        Err(err @ (Error::InvalidParameter { .. } | Error::UnpermittedParameter { .. })) => {
            tracing::info!(error = %err, "input rejected");
            writeln!(out, "{}", serde_json::to_string_pretty(&error_report(&err))?)?;
            Ok(1)
        }
        Err(err) => Err(err).context("processing failed"),
    }
}

/// Environment configuration, overridden by explicit flags.
fn configuration(args: &CheckArgs) -> Result<Configuration> {
    let mut config = Configuration::from_env().context("invalid environment configuration")?;
    if args.ignore_nil_optionals {
        config.ignore_nil_optionals = true;
    }
    if let Some(raw) = &args.path_casing {
        config.path_casing = Casing::parse_opt(raw).context("invalid --path-casing")?;
    }
    if let Some(raw) = &args.key_casing {
        config.key_casing = Casing::parse_opt(raw).context("invalid --key-casing")?;
    }
    Ok(config)
}

fn read_input(path: &Path) -> Result<Value> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| matches!(ext, "yaml" | "yml"));
    parse_input(&src, is_yaml).with_context(|| format!("failed to parse input {}", path.display()))
}

fn parse_input(src: &str, yaml: bool) -> Result<Value> {
    let json: serde_json::Value = if yaml {
        serde_yaml::from_str(src)?
    } else {
        serde_json::from_str(src)?
    };
    Ok(Value::from(json))
}

fn error_report(err: &Error) -> serde_json::Value {
    json!({
        "error": err.to_string(),
        "kind": err.kind(),
        "path": err.path().map(|p| p.to_string()),
        "pointer": err.path().map(|p| p.to_json_pointer()),
        "source": err.origin().map(|s| s.to_string()),
    })
}

//! `tparams` binary: check request documents against parameter schemas.
//!
//! Logs go to stderr so stdout carries only the processed document.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tparams_cli::check::{run_check, CheckArgs};

/// Typed params toolchain.
///
/// Checks request documents against declarative parameter schemas and
/// prints the processed parameters.
#[derive(Parser, Debug)]
#[command(name = "tparams", version, about, long_about = None)]
struct Cli {
    /// Log level: warn by default, -v info, -vv debug, -vvv trace.
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process an input document against a schema definition.
    Check(CheckArgs),
}

fn log_filter(verbose: u8) -> EnvFilter {
    let level = ["warn", "info", "debug"].get(usize::from(verbose)).copied().unwrap_or("trace");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn init_logging(cli: &Cli) {
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut stdout = std::io::stdout().lock();
    let outcome = match &cli.command {
        Commands::Check(args) => run_check(args, &mut stdout),
    };

    outcome.map(ExitCode::from).unwrap_or_else(|e| {
        tracing::error!(error = %format!("{e:#}"), "check aborted");
        ExitCode::from(2)
    })
}

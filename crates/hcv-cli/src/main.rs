//! # hcv CLI entry point
//!
//! Parses command-line arguments, installs logging, loads configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hcv_cli::config::CliConfig;
use hcv_cli::inspect::{run_inspect, InspectArgs};
use hcv_cli::verify::{run_verify, VerifyArgs};
use hcv_cli::EXIT_ERROR;

/// Health credential verifier.
///
/// Decodes a presented credential (structured JSON, compact JWS or CBOR/CWT)
/// and checks it against trust, revocation, expiry, type and rule policy.
#[derive(Parser, Debug)]
#[command(name = "hcv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to configuration file (YAML or JSON).
    #[arg(long, global = true, env = "HCV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify a credential and report pass, fail or unknown.
    Verify(VerifyArgs),

    /// Print the normalized view of a credential.
    Inspect(InspectArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG takes precedence over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "hcv starting");

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Verify(args) => run_verify(&args, &config),
        Commands::Inspect(args) => run_inspect(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

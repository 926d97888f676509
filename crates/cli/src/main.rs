//! # Sensor Control CLI
//!
//! Command-line entry point.
//!
//! - Device / sensor / option / profile enumeration
//! - Option reset and streaming walkthrough
//! - Rig description validation

mod cli;
mod commands;
mod error;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::Layer;

use cli::{Cli, Commands};
use commands::{run_enumerate, run_reset, run_stream, run_validate};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    if cli.metrics_port != 0 {
        if let Err(e) = observability::init_metrics_only(cli.metrics_port) {
            error::report(&e);
            return ExitCode::FAILURE;
        }
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Sensor Control CLI starting"
    );

    let rig = cli.rig.as_deref();
    let result = match &cli.command {
        Commands::Enumerate(args) => run_enumerate(rig, args),
        Commands::Stream(args) => run_stream(rig, args).await,
        Commands::Reset(args) => run_reset(rig, args),
        Commands::Validate(args) => run_validate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Command failed");
            error::report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging based on CLI options
///
/// Logs go to stderr, stdout carries the command output.
fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else {
        let default_level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let fmt_layer = match cli.log_format {
        cli::LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        cli::LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .boxed(),
        cli::LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

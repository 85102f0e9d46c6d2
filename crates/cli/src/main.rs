//! # TSR Harness CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Run configuration loading and validation
//! - Capture-run orchestration (mock or real CARLA)
//! - Real-time mode restoration for abandoned simulators

mod cli;
mod commands;
mod logfile;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::Layer;

use cli::{Cli, Commands};
use commands::{run_capture, run_info, run_restore, run_validate};
use logfile::LateLogFile;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options. The file layer stays
    // dormant until the run command binds it to the result folder.
    let log_file = LateLogFile::new();
    init_logging(&cli, log_file.clone())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "TSR Harness CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_capture(args, &log_file).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Restore(args) => run_restore(args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli, log_file: LateLogFile) -> Result<()> {
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

    let console_layer = match cli.log_format {
        cli::LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        cli::LogFormat::Pretty => fmt::layer().pretty().boxed(),
        cli::LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    // Plain-text mirror of every line into the per-run log file
    let file_layer = fmt::layer().with_ansi(false).with_writer(log_file);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

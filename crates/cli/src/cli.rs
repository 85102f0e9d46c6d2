//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// TSR Harness - traffic-sign capture runs against the CARLA simulator
#[derive(Parser, Debug)]
#[command(
    name = "tsr-harness",
    author,
    version,
    about = "CARLA traffic-sign capture harness",
    long_about = "A capture harness for the CARLA simulator.\n\n\
                  Connects to CARLA, switches the world to a stepped clock, drives an \n\
                  autopilot vehicle past traffic signs and records camera frames under \n\
                  varying camera presets, weather and adversarial sign textures."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TSR_HARNESS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TSR_HARNESS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a capture test
    Run(RunArgs),

    /// Validate a run configuration without connecting
    Validate(ValidateArgs),

    /// Display run configuration information
    Info(InfoArgs),

    /// Switch an abandoned simulator back to real-time mode
    Restore(RestoreArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Results directory; falls back to the config's results_root, then ./results
    pub results: Option<PathBuf>,

    /// Path to run configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "configs/demo.toml",
        env = "TSR_HARNESS_CONFIG"
    )]
    pub config: PathBuf,

    /// Override CARLA server host from configuration
    #[arg(long, env = "CARLA_HOST")]
    pub host: Option<String>,

    /// Override CARLA server port from configuration
    #[arg(long, env = "CARLA_PORT")]
    pub port: Option<u16>,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "configs/demo.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/demo.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed camera information
    #[arg(long)]
    pub cameras: bool,

    /// Show the resolved texture plan
    #[arg(long)]
    pub textures: bool,
}

/// Arguments for the `restore` command
#[derive(Parser, Debug)]
pub struct RestoreArgs {
    /// CARLA server host
    #[arg(long, default_value = "127.0.0.1", env = "CARLA_HOST")]
    pub host: String,

    /// CARLA server port
    #[arg(long, default_value = "2000", env = "CARLA_PORT")]
    pub port: u16,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

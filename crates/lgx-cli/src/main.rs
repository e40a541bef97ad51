//! # lgx CLI entry point
//!
//! Parses command-line arguments, resolves configuration and dispatches to
//! the shipment subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lgx_cli::commands::{run_command, CliContext, Commands};
use lgx_cli::config::CliConfig;

/// LGX shipment milestone tracker.
///
/// Tracks the ordered milestones of import and export shipments by air or
/// sea. Completion follows the selected milestone order.
#[derive(Parser, Debug)]
#[command(name = "lgx", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding session files.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "lgx starting");

    let result = CliConfig::from_sources(cli.config.as_deref(), cli.state_dir.as_deref())
        .and_then(|config| CliContext::from_config(&config))
        .and_then(|ctx| run_command(&cli.command, &ctx));

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

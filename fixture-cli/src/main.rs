//! Fixture CLI - Command-line interface
//!
//! Runs named crash-reporter scenarios the way the end-to-end harness does.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use fixture_core::config::FixtureConfig;
use fixture_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "fixture")]
#[command(about = "Runs named crash-reporter test scenarios")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info, global = true)]
    log_level: CliLogLevel,

    /// Directory for the full trace log (defaults to FIXTURE_LOGS_DIR or ./logs)
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = FixtureConfig::from_env();
    if let Some(logs_dir) = cli.logs_dir {
        config.logging.logs_dir = logs_dir;
    }

    init_tracing(
        cli.log_level.as_tracing_level(),
        Some(&config.logging.logs_dir),
    )
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    commands::handle_command(cli.command, config).await
}

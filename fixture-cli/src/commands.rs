//! CLI command implementations

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use fixture_core::config::FixtureConfig;
use fixture_core::reporter::{CrashReporter, SimulatedReporter};
use fixture_scenarios::{ScenarioResult, ScenarioResults, global_registry};
use tracing::info;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List registered scenarios
    List,
    /// Run one or more scenarios by name
    Run {
        /// Scenario names, e.g. CrashScenario
        #[arg(required = true)]
        names: Vec<String>,
        /// Reporter API key (defaults to FIXTURE_API_KEY or the test key)
        #[arg(long)]
        api_key: Option<String>,
        /// Release stage attached to reports
        #[arg(long)]
        release_stage: Option<String>,
        /// Event mode handed to each scenario before it starts
        #[arg(long)]
        event_mode: Option<String>,
        /// Deliver a background transition this many milliseconds into run
        #[arg(long)]
        background_after_ms: Option<u64>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns the first failure from the selected command
pub async fn handle_command(command: Commands, mut config: FixtureConfig) -> anyhow::Result<()> {
    match command {
        Commands::List => list_scenarios(),
        Commands::Run {
            names,
            api_key,
            release_stage,
            event_mode,
            background_after_ms,
            json,
        } => {
            if let Some(api_key) = api_key {
                config.reporter.api_key = api_key;
            }
            if let Some(stage) = release_stage {
                config.reporter.release_stage = stage;
            }
            if event_mode.is_some() {
                config.runner.event_mode = event_mode;
            }
            if let Some(ms) = background_after_ms {
                config.runner.background_after = Some(Duration::from_millis(ms));
            }

            run_scenarios(names, config, json).await
        }
    }
}

fn list_scenarios() -> anyhow::Result<()> {
    for descriptor in global_registry().descriptors() {
        println!("{:<28} {}", descriptor.name(), descriptor.description());
    }
    Ok(())
}

/// Run each named scenario against a fresh reporter
///
/// # Errors
/// - Unknown scenario name
/// - Scenario failed to start or returned an error from run
pub async fn run_scenarios(
    names: Vec<String>,
    config: FixtureConfig,
    json: bool,
) -> anyhow::Result<()> {
    info!("Running {} scenario(s)", names.len());
    let (names, results) = tokio::task::spawn_blocking(move || {
        let results = ScenarioResults::run_all(global_registry(), &names, &config, || {
            Arc::new(SimulatedReporter::new()) as Arc<dyn CrashReporter>
        });
        (names, results)
    })
    .await?;
    let results = results.context("scenario run did not complete")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for name in &names {
            if let Some(result) = results.get_result(name) {
                print_result(result);
            }
        }
    }

    Ok(())
}

fn print_result(result: &ScenarioResult) {
    println!("{} -> {} ({} ms)", result.name, result.phase, result.duration_ms);
    if let Some(mode) = &result.event_mode {
        println!("  event mode: {mode}");
    }
    if let Some(message) = &result.crash_message {
        println!("  fault: {message}");
    }
    if let Some(report) = &result.crash_report {
        println!(
            "  report {}: unhandled={}, severity={}",
            report.id,
            report.unhandled,
            report.severity.as_str()
        );
    }
}

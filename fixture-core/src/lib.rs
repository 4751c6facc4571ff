//! Fixture Core - Configuration and crash-reporter boundary
//!
//! This crate provides the pieces every scenario run depends on: the reporter
//! configuration shared between harness and scenario, the crash-reporter
//! collaborator trait with its crash-time report writer, and tracing setup.

pub mod config;
pub mod reporter;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ConfigError, FixtureConfig, ReporterConfig, SharedConfiguration};
pub use reporter::{
    CrashReport, CrashReporter, FixedReportWriter, HandledError, OnCrashHandler, ReportWriter,
    ReporterError, SimulatedReporter,
};

/// Errors that can bubble up from any fixture subsystem.
///
/// High-level error types surfaced to the harness driving a scenario run.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Unknown scenario: {name}")]
    UnknownScenario { name: String },

    #[error("Scenario already registered: {name}")]
    DuplicateScenario { name: String },

    #[error("Cannot {operation} while scenario is {phase}")]
    Lifecycle {
        operation: &'static str,
        phase: String,
    },

    #[error("Scenario {name} failed: {reason}")]
    ScenarioFailed { name: String, reason: String },

    #[error("Reporter error: {0}")]
    Reporter(#[from] ReporterError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl FixtureError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            FixtureError::UnknownScenario { name } => {
                format!("No scenario named '{name}' is registered")
            }
            FixtureError::DuplicateScenario { name } => {
                format!("Scenario '{name}' is registered twice")
            }
            FixtureError::Lifecycle { operation, phase } => {
                format!("Scenario cannot {operation} while {phase}")
            }
            FixtureError::ScenarioFailed { name, .. } => format!("Scenario '{name}' failed"),
            FixtureError::Reporter(e) => match e {
                ReporterError::InvalidConfiguration(reason) => {
                    format!("Crash reporter rejected configuration: {reason}")
                }
                _ => "Crash reporter error occurred".to_string(),
            },
            FixtureError::Configuration(ConfigError::Frozen) => {
                "Configuration cannot change after the reporter started".to_string()
            }
            FixtureError::Configuration(_) => "Configuration error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            FixtureError::UnknownScenario { .. }
                | FixtureError::Configuration(ConfigError::InvalidApiKey { .. })
                | FixtureError::Reporter(ReporterError::InvalidConfiguration(
                    ConfigError::InvalidApiKey { .. }
                ))
        )
    }
}

pub type Result<T> = std::result::Result<T, FixtureError>;

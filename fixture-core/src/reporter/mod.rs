//! Crash-reporter collaborator boundary.
//!
//! Scenarios talk to the crash-reporting SDK only through [`CrashReporter`].
//! The SDK calls back into the process through an [`OnCrashHandler`] handed a
//! [`ReportWriter`] while the crash report is being written.

pub mod simulated;
pub mod types;
pub mod writer;

pub use simulated::SimulatedReporter;
pub use types::{CrashReport, HandledError, SEVERITY_KEY, Session, Severity, UNHANDLED_KEY};
pub use writer::{FixedReportWriter, OnCrashHandler, ReportValue, ReportWriter, WRITER_CAPACITY};
use uuid::Uuid;

use crate::config::{ConfigError, ReporterConfig};

/// Errors returned by a crash reporter.
#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    #[error("Reporter has already been started")]
    AlreadyStarted,

    #[error("Reporter has not been started")]
    NotStarted,

    #[error("Invalid reporter configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

/// Crash-reporting SDK as seen by a scenario.
pub trait CrashReporter: Send + Sync {
    /// Starts monitoring the process using `config`.
    ///
    /// # Errors
    ///
    /// - `ReporterError::AlreadyStarted` - `start` was already called
    /// - `ReporterError::InvalidConfiguration` - `config` failed validation
    fn start(&self, config: &ReporterConfig) -> Result<(), ReporterError>;

    /// Returns whether the reporter is monitoring the process.
    fn is_started(&self) -> bool;

    /// Records an error the scenario handled itself.
    ///
    /// # Errors
    ///
    /// - `ReporterError::NotStarted` - The reporter was never started
    fn notify(&self, error: HandledError) -> Result<(), ReporterError>;

    /// Begins a new session, replacing any current one.
    ///
    /// # Errors
    ///
    /// - `ReporterError::NotStarted` - The reporter was never started
    fn start_session(&self) -> Result<Uuid, ReporterError>;

    /// Captures an unhandled fault.
    ///
    /// Invokes the configured on-crash handler while writing the report. A
    /// handler that panics is abandoned and the report is kept as written so
    /// far. Returns the recorded report, or `None` when the reporter is not
    /// monitoring or the report was suppressed.
    fn capture_crash(&self, message: &str) -> Option<CrashReport>;
}

//! Lifecycle of a single constructed scenario.
//!
//! A session enforces `constructed -> started -> running -> completed|crashed`.
//! A panic escaping `run` is the fault under test: it is caught and handed to
//! the reporter as a crash, which is when the on-crash handler runs.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use fixture_core::FixtureError;
use fixture_core::config::SharedConfiguration;
use fixture_core::reporter::{CrashReport, CrashReporter};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::scenario::{EventMode, Scenario};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPhase {
    Constructed,
    Started,
    Running,
    Completed,
    Crashed,
}

impl ScenarioPhase {
    /// Returns true once the scenario can make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, ScenarioPhase::Completed | ScenarioPhase::Crashed)
    }
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioPhase::Constructed => write!(f, "constructed"),
            ScenarioPhase::Started => write!(f, "started"),
            ScenarioPhase::Running => write!(f, "running"),
            ScenarioPhase::Completed => write!(f, "completed"),
            ScenarioPhase::Crashed => write!(f, "crashed"),
        }
    }
}

/// How `run` ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// `run` returned normally.
    Completed,
    /// `run` panicked; `report` is what the reporter recorded, if anything.
    Crashed {
        message: String,
        report: Option<CrashReport>,
    },
}

/// A constructed scenario bound to a reporter.
pub struct ScenarioSession {
    name: String,
    scenario: Arc<dyn Scenario>,
    reporter: Arc<dyn CrashReporter>,
    phase: Arc<Mutex<ScenarioPhase>>,
}

impl ScenarioSession {
    pub(crate) fn new(
        name: impl Into<String>,
        scenario: Arc<dyn Scenario>,
        reporter: Arc<dyn CrashReporter>,
    ) -> Self {
        Self {
            name: name.into(),
            scenario,
            reporter,
            phase: Arc::new(Mutex::new(ScenarioPhase::Constructed)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> ScenarioPhase {
        *self.phase.lock()
    }

    pub fn scenario(&self) -> &Arc<dyn Scenario> {
        &self.scenario
    }

    pub fn config(&self) -> &SharedConfiguration {
        self.scenario.config()
    }

    pub fn event_mode(&self) -> &EventMode {
        self.scenario.event_mode()
    }

    /// Starts the crash reporter through the scenario.
    ///
    /// The configuration is frozen once the reporter is running. Holds the
    /// phase lock until the start has finished.
    ///
    /// # Errors
    ///
    /// - `FixtureError::Lifecycle` - The session was already started
    /// - `FixtureError::Reporter` - The reporter refused to start
    /// - `FixtureError::Configuration` - The scenario could not adjust its configuration
    /// - `FixtureError::ScenarioFailed` - The scenario failed for another reason
    pub fn start_bugsnag(&self) -> Result<(), FixtureError> {
        let mut phase = self.phase.lock();
        check_phase("start", *phase, ScenarioPhase::Constructed)?;

        self.scenario
            .start_bugsnag(self.reporter.as_ref())
            .map_err(|e| e.into_fixture_error(&self.name))?;

        self.config().freeze();
        *phase = ScenarioPhase::Started;
        info!("Scenario {} started reporter", self.name);
        Ok(())
    }

    /// Runs the scenario's test logic.
    ///
    /// # Errors
    ///
    /// - `FixtureError::Lifecycle` - `start_bugsnag` has not succeeded yet, or the
    ///   scenario already ran
    /// - `FixtureError::Reporter` - The reporter rejected a call made by `run`
    /// - `FixtureError::ScenarioFailed` - `run` returned any other error
    pub fn run(&self) -> Result<RunOutcome, FixtureError> {
        {
            let mut phase = self.phase.lock();
            check_phase("run", *phase, ScenarioPhase::Started)?;
            *phase = ScenarioPhase::Running;
        }
        info!("Running scenario {}", self.name);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.scenario.run(self.reporter.as_ref())
        }));

        match result {
            Ok(Ok(())) => {
                *self.phase.lock() = ScenarioPhase::Completed;
                info!("Scenario {} completed", self.name);
                Ok(RunOutcome::Completed)
            }
            Ok(Err(e)) => {
                *self.phase.lock() = ScenarioPhase::Completed;
                warn!("Scenario {} failed: {e}", self.name);
                Err(e.into_fixture_error(&self.name))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let report = self.reporter.capture_crash(&message);
                *self.phase.lock() = ScenarioPhase::Crashed;
                info!(
                    "Scenario {} crashed: {message} (report recorded: {})",
                    self.name,
                    report.is_some()
                );
                Ok(RunOutcome::Crashed { message, report })
            }
        }
    }

    /// Returns a handle that delivers background transitions to the scenario.
    pub fn background_notifier(&self) -> BackgroundNotifier {
        BackgroundNotifier {
            name: self.name.clone(),
            scenario: Arc::clone(&self.scenario),
            phase: Arc::clone(&self.phase),
        }
    }
}

impl fmt::Debug for ScenarioSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioSession")
            .field("name", &self.name)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

/// Sink for host background-transition notifications.
///
/// Cloneable and sendable so the host's notification thread can hold one
/// while `run` executes elsewhere.
#[derive(Clone)]
pub struct BackgroundNotifier {
    name: String,
    scenario: Arc<dyn Scenario>,
    phase: Arc<Mutex<ScenarioPhase>>,
}

impl BackgroundNotifier {
    /// Delivers one background transition to the scenario.
    pub fn did_enter_background(&self) {
        let phase = *self.phase.lock();
        debug!("Scenario {} entered background while {phase}", self.name);
        self.scenario.did_enter_background_notification();
    }
}

impl fmt::Debug for BackgroundNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundNotifier")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn check_phase(
    operation: &'static str,
    phase: ScenarioPhase,
    expected: ScenarioPhase,
) -> Result<(), FixtureError> {
    if phase != expected {
        return Err(FixtureError::Lifecycle {
            operation,
            phase: phase.to_string(),
        });
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown fault".to_string()
    }
}

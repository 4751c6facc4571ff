//! Scenario contract shared by every named test case.

use fixture_core::FixtureError;
use fixture_core::config::{ConfigError, SharedConfiguration};
use fixture_core::reporter::{CrashReporter, ReporterError};
use parking_lot::RwLock;

/// Errors a scenario can return from its lifecycle methods.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Reporter error: {0}")]
    Reporter(#[from] ReporterError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{reason}")]
    Failed { reason: String },
}

impl ScenarioError {
    /// Lifts the error to the harness level, attributing it to scenario `name`.
    ///
    /// Reporter and configuration errors keep their type so callers can tell
    /// a rejected API key from a failing test case.
    pub fn into_fixture_error(self, name: &str) -> FixtureError {
        match self {
            ScenarioError::Reporter(e) => FixtureError::Reporter(e),
            ScenarioError::Configuration(e) => FixtureError::Configuration(e),
            ScenarioError::Failed { reason } => FixtureError::ScenarioFailed {
                name: name.to_string(),
                reason,
            },
        }
    }
}

/// Free-form mode label consulted by scenario logic.
///
/// Readable and settable from the harness, from `run`, and from the
/// background hook; every access goes through the lock, so a value set by one
/// is visible to the next reader.
#[derive(Debug, Default)]
pub struct EventMode {
    value: RwLock<Option<String>>,
}

impl EventMode {
    /// Returns the current mode, if one is set.
    pub fn get(&self) -> Option<String> {
        self.value.read().clone()
    }

    /// Sets the mode, replacing any earlier value.
    pub fn set(&self, mode: impl Into<String>) {
        *self.value.write() = Some(mode.into());
    }

    /// Unsets the mode.
    pub fn clear(&self) {
        *self.value.write() = None;
    }

    /// Returns true if the current mode equals `mode`.
    pub fn is(&self, mode: &str) -> bool {
        self.value.read().as_deref() == Some(mode)
    }
}

/// State every scenario carries: its configuration handle and event mode.
#[derive(Debug)]
pub struct ScenarioBase {
    config: SharedConfiguration,
    event_mode: EventMode,
}

impl ScenarioBase {
    /// Wires a scenario to its configuration. Performs no I/O.
    pub fn new(config: SharedConfiguration) -> Self {
        Self {
            config,
            event_mode: EventMode::default(),
        }
    }
}

/// A named test case exercising one crash or error-handling condition.
///
/// Instances are built by a registry factory, started once with
/// [`start_bugsnag`](Self::start_bugsnag), then [`run`](Self::run). The
/// background hook may be delivered from another thread at any point while
/// `run` executes.
pub trait Scenario: Send + Sync {
    /// Returns the state shared by all scenarios.
    fn base(&self) -> &ScenarioBase;

    /// Returns the configuration this scenario was constructed with.
    fn config(&self) -> &SharedConfiguration {
        &self.base().config
    }

    /// Returns the scenario's event mode.
    fn event_mode(&self) -> &EventMode {
        &self.base().event_mode
    }

    /// Starts the crash reporter with the stored configuration.
    ///
    /// Variants that need different settings adjust the configuration and
    /// then call [`start_reporter`].
    ///
    /// # Errors
    ///
    /// - `ScenarioError::Reporter` - The reporter refused to start
    /// - `ScenarioError::Configuration` - The configuration could not be adjusted
    fn start_bugsnag(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        start_reporter(self.config(), reporter)
    }

    /// Executes the test case. May deliberately panic.
    ///
    /// # Errors
    ///
    /// - `ScenarioError` - The scenario could not carry out its test logic
    fn run(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError>;

    /// Called when the host reports a transition to the background.
    fn did_enter_background_notification(&self) {}
}

/// Starts `reporter` with the current contents of `config`.
///
/// # Errors
///
/// - `ScenarioError::Reporter` - The reporter refused to start
pub fn start_reporter(
    config: &SharedConfiguration,
    reporter: &dyn CrashReporter,
) -> Result<(), ScenarioError> {
    let snapshot = config.snapshot();
    reporter.start(&snapshot)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use fixture_core::config::ReporterConfig;
    use fixture_core::reporter::SimulatedReporter;

    use super::*;

    struct PlainScenario {
        base: ScenarioBase,
    }

    impl Scenario for PlainScenario {
        fn base(&self) -> &ScenarioBase {
            &self.base
        }

        fn run(&self, _reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
            Ok(())
        }
    }

    #[test]
    fn test_error_lifting_keeps_reporter_errors_typed() {
        let error = ScenarioError::from(ReporterError::AlreadyStarted).into_fixture_error("Plain");
        assert!(matches!(
            error,
            FixtureError::Reporter(ReporterError::AlreadyStarted)
        ));

        let error = ScenarioError::from(ConfigError::Frozen).into_fixture_error("Plain");
        assert!(matches!(error, FixtureError::Configuration(ConfigError::Frozen)));

        let error = ScenarioError::Failed {
            reason: "no data".to_string(),
        }
        .into_fixture_error("Plain");
        assert!(matches!(
            error,
            FixtureError::ScenarioFailed { ref name, ref reason } if name == "Plain" && reason == "no data"
        ));
    }

    #[test]
    fn test_event_mode_accessors() {
        let mode = EventMode::default();
        assert_eq!(mode.get(), None);

        mode.set("recover");
        assert!(mode.is("recover"));
        assert_eq!(mode.get().as_deref(), Some("recover"));

        mode.clear();
        assert!(!mode.is("recover"));
        assert_eq!(mode.get(), None);
    }

    #[test]
    fn test_construction_keeps_config_identity() {
        let config = SharedConfiguration::new(ReporterConfig::for_testing());
        let scenario = PlainScenario {
            base: ScenarioBase::new(config.clone()),
        };

        assert!(scenario.config().ptr_eq(&config));
        assert_eq!(scenario.event_mode().get(), None);
    }

    #[test]
    fn test_default_background_hook_leaves_mode_untouched() {
        let scenario = PlainScenario {
            base: ScenarioBase::new(ReporterConfig::for_testing().into()),
        };
        scenario.event_mode().set("normal");

        scenario.did_enter_background_notification();
        scenario.did_enter_background_notification();

        assert_eq!(scenario.event_mode().get().as_deref(), Some("normal"));
    }

    #[test]
    fn test_default_start_uses_stored_config() {
        let scenario = PlainScenario {
            base: ScenarioBase::new(ReporterConfig::for_testing().into()),
        };
        scenario
            .config()
            .update(|c| c.release_stage = "beta".to_string())
            .unwrap();
        let reporter = SimulatedReporter::new();

        scenario.start_bugsnag(&reporter).unwrap();

        assert!(reporter.is_started());
        assert_eq!(reporter.started_config().unwrap().release_stage, "beta");
    }
}

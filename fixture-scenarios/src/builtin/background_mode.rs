//! Scenario that reacts to the app entering the background.

use std::thread;
use std::time::{Duration, Instant};

use fixture_core::config::SharedConfiguration;
use fixture_core::reporter::{CrashReporter, HandledError};
use tracing::debug;

use crate::registry::ScenarioDescriptor;
use crate::scenario::{Scenario, ScenarioBase, ScenarioError};

pub const NAME: &str = "BackgroundModeScenario";

/// Event mode set by the background hook.
pub const BACKGROUND_MODE: &str = "background";

/// How long `run` waits for a background transition.
const BACKGROUND_WAIT: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Waits in `run` for a background transition and reports it.
///
/// The background hook sets the event mode to [`BACKGROUND_MODE`]; repeated
/// notifications leave it unchanged. If no transition arrives within
/// two seconds, `run` completes without reporting.
#[derive(Debug)]
pub struct BackgroundModeScenario {
    base: ScenarioBase,
}

impl BackgroundModeScenario {
    pub fn new(config: SharedConfiguration) -> Self {
        Self {
            base: ScenarioBase::new(config),
        }
    }
}

impl Scenario for BackgroundModeScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn run(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        let deadline = Instant::now() + BACKGROUND_WAIT;
        while !self.event_mode().is(BACKGROUND_MODE) {
            if Instant::now() >= deadline {
                debug!("No background transition before deadline");
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }

        reporter.notify(HandledError::new(NAME, "entered background during run"))?;
        Ok(())
    }

    fn did_enter_background_notification(&self) {
        self.event_mode().set(BACKGROUND_MODE);
    }
}

pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(
        NAME,
        "Waits for a background transition and reports it as a handled error",
        |config| Box::new(BackgroundModeScenario::new(config)),
    )
}

#[cfg(test)]
mod tests {
    use fixture_core::config::ReporterConfig;
    use fixture_core::reporter::SimulatedReporter;

    use super::*;

    #[test]
    fn test_hook_is_idempotent() {
        let scenario = BackgroundModeScenario::new(ReporterConfig::for_testing().into());

        for _ in 0..5 {
            scenario.did_enter_background_notification();
        }

        assert_eq!(scenario.event_mode().get().as_deref(), Some(BACKGROUND_MODE));
    }

    #[test]
    fn test_already_backgrounded_reports_immediately() {
        let scenario = BackgroundModeScenario::new(ReporterConfig::for_testing().into());
        let reporter = SimulatedReporter::new();
        scenario.start_bugsnag(&reporter).unwrap();
        scenario.did_enter_background_notification();

        scenario.run(&reporter).unwrap();

        assert_eq!(reporter.reports().len(), 1);
    }
}

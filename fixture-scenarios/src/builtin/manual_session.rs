//! Scenario that disables automatic sessions and starts one by hand.

use fixture_core::config::SharedConfiguration;
use fixture_core::reporter::{CrashReporter, HandledError};
use tracing::debug;

use crate::registry::ScenarioDescriptor;
use crate::scenario::{Scenario, ScenarioBase, ScenarioError, start_reporter};

pub const NAME: &str = "ManualSessionScenario";

#[derive(Debug)]
pub struct ManualSessionScenario {
    base: ScenarioBase,
}

impl ManualSessionScenario {
    pub fn new(config: SharedConfiguration) -> Self {
        Self {
            base: ScenarioBase::new(config),
        }
    }
}

impl Scenario for ManualSessionScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn start_bugsnag(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        self.config().update(|c| c.auto_track_sessions = false)?;
        start_reporter(self.config(), reporter)
    }

    fn run(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        let session_id = reporter.start_session()?;
        debug!("Manual session {session_id} started");
        reporter.notify(HandledError::new(NAME, "error inside manual session"))?;
        Ok(())
    }
}

pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(
        NAME,
        "Starts a session manually and reports a handled error inside it",
        |config| Box::new(ManualSessionScenario::new(config)),
    )
}

//! Scenario whose run returns immediately.

use fixture_core::config::SharedConfiguration;
use fixture_core::reporter::CrashReporter;

use crate::registry::ScenarioDescriptor;
use crate::scenario::{Scenario, ScenarioBase, ScenarioError};

pub const NAME: &str = "NoOpScenario";

/// Starts the reporter and does nothing else.
#[derive(Debug)]
pub struct NoOpScenario {
    base: ScenarioBase,
}

impl NoOpScenario {
    pub fn new(config: SharedConfiguration) -> Self {
        Self {
            base: ScenarioBase::new(config),
        }
    }
}

impl Scenario for NoOpScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn run(&self, _reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        Ok(())
    }
}

pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(NAME, "Starts the reporter and exits normally", |config| {
        Box::new(NoOpScenario::new(config))
    })
}

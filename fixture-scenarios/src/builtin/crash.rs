//! Scenario that deliberately faults after marking crashes as handled.

use fixture_core::config::SharedConfiguration;
use fixture_core::reporter::CrashReporter;

use crate::callbacks::mark_error_handled_callback;
use crate::registry::ScenarioDescriptor;
use crate::scenario::{Scenario, ScenarioBase, ScenarioError, start_reporter};

pub const NAME: &str = "CrashScenario";

/// Panic message raised by [`CrashScenario::run`].
pub const FAULT_MESSAGE: &str = "CrashScenario: deliberate fault";

/// Installs [`mark_error_handled_callback`] as the on-crash handler, then
/// panics in `run`.
#[derive(Debug)]
pub struct CrashScenario {
    base: ScenarioBase,
}

impl CrashScenario {
    pub fn new(config: SharedConfiguration) -> Self {
        Self {
            base: ScenarioBase::new(config),
        }
    }
}

impl Scenario for CrashScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn start_bugsnag(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        self.config()
            .update(|c| c.on_crash_handler = Some(mark_error_handled_callback))?;
        start_reporter(self.config(), reporter)
    }

    fn run(&self, _reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        panic!("{FAULT_MESSAGE}");
    }
}

pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(
        NAME,
        "Faults in run; the crash report is marked handled at write time",
        |config| Box::new(CrashScenario::new(config)),
    )
}

//! Scenario that reports an error it handled itself.

use fixture_core::config::SharedConfiguration;
use fixture_core::reporter::{CrashReporter, HandledError};

use crate::registry::ScenarioDescriptor;
use crate::scenario::{Scenario, ScenarioBase, ScenarioError};

pub const NAME: &str = "HandledErrorScenario";

#[derive(Debug)]
pub struct HandledErrorScenario {
    base: ScenarioBase,
}

impl HandledErrorScenario {
    pub fn new(config: SharedConfiguration) -> Self {
        Self {
            base: ScenarioBase::new(config),
        }
    }
}

impl Scenario for HandledErrorScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn run(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        let message = match self.event_mode().get() {
            Some(mode) => format!("handled error in mode {mode}"),
            None => "handled error".to_string(),
        };
        reporter.notify(HandledError::new(NAME, message))?;
        Ok(())
    }
}

pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(
        NAME,
        "Reports a handled error through notify",
        |config| Box::new(HandledErrorScenario::new(config)),
    )
}

#[cfg(test)]
mod tests {
    use fixture_core::config::ReporterConfig;
    use fixture_core::reporter::SimulatedReporter;

    use super::*;

    #[test]
    fn test_message_includes_event_mode() {
        let scenario = HandledErrorScenario::new(ReporterConfig::for_testing().into());
        let reporter = SimulatedReporter::new();
        scenario.start_bugsnag(&reporter).unwrap();
        scenario.event_mode().set("retry");

        scenario.run(&reporter).unwrap();

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "handled error in mode retry");
        assert!(!reports[0].unhandled);
    }

    #[test]
    fn test_run_without_reporter_fails() {
        let scenario = HandledErrorScenario::new(ReporterConfig::for_testing().into());
        let reporter = SimulatedReporter::new();

        let result = scenario.run(&reporter);
        assert!(matches!(result, Err(ScenarioError::Reporter(_))));
    }
}

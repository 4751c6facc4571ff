//! A scenario that returns immediately from run.

use std::sync::Arc;

use fixture_core::config::{ReporterConfig, RunnerConfig, SharedConfiguration};
use fixture_core::reporter::{CrashReporter, SimulatedReporter};
use fixture_scenarios::{RunOutcome, ScenarioPhase, ScenarioRunner, global_registry};

#[test]
fn test_noop_full_lifecycle_without_crash_callback() {
    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(global_registry(), reporter.clone());
    let config = SharedConfiguration::new(ReporterConfig::for_testing());

    let session = runner
        .create_scenario_named("NoOpScenario", config.clone())
        .unwrap();
    assert_eq!(session.phase(), ScenarioPhase::Constructed);

    session.start_bugsnag().unwrap();
    assert_eq!(session.phase(), ScenarioPhase::Started);
    assert!(reporter.is_started());

    let outcome = session.run().unwrap();
    assert!(matches!(outcome, RunOutcome::Completed));
    assert_eq!(session.phase(), ScenarioPhase::Completed);

    drop(session);

    assert_eq!(reporter.crash_callback_invocations(), 0);
    assert!(reporter.reports().is_empty());
    assert_eq!(reporter.sessions_started(), 1);
    // Caller keeps the configuration after the scenario is discarded
    assert!(config.is_frozen());
}

#[test]
fn test_handled_error_scenario_reports_without_crash() {
    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(global_registry(), reporter.clone());

    let result = runner
        .execute(
            "HandledErrorScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
            &RunnerConfig::default(),
        )
        .unwrap();

    assert!(!result.crashed());
    assert_eq!(reporter.crash_callback_invocations(), 0);

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].unhandled);
    assert_eq!(reports[0].error_class, "HandledErrorScenario");
}

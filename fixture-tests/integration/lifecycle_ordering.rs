//! Lifecycle ordering enforced by scenario sessions.

use std::sync::Arc;

use fixture_core::FixtureError;
use fixture_core::config::{ConfigError, ReporterConfig, RunnerConfig, SharedConfiguration};
use fixture_core::reporter::{CrashReporter, ReporterError, SimulatedReporter};
use fixture_scenarios::{ScenarioPhase, ScenarioRunner, global_registry};

fn runner_with_reporter() -> (ScenarioRunner<'static>, Arc<SimulatedReporter>) {
    let reporter = Arc::new(SimulatedReporter::new());
    (
        ScenarioRunner::new(global_registry(), reporter.clone()),
        reporter,
    )
}

#[test]
fn test_run_before_start_leaves_reporter_uninitialized() {
    let (runner, reporter) = runner_with_reporter();
    let session = runner
        .create_scenario_named(
            "CrashScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
        )
        .unwrap();

    let result = session.run();

    assert!(matches!(
        result,
        Err(FixtureError::Lifecycle { operation: "run", ref phase }) if phase == "constructed"
    ));
    assert_eq!(session.phase(), ScenarioPhase::Constructed);
    assert!(!reporter.is_started());
    assert_eq!(reporter.crash_callback_invocations(), 0);
    assert!(reporter.reports().is_empty());
}

#[test]
fn test_start_twice_is_rejected() {
    let (runner, reporter) = runner_with_reporter();
    let session = runner
        .create_scenario_named(
            "NoOpScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
        )
        .unwrap();

    session.start_bugsnag().unwrap();
    let result = session.start_bugsnag();

    assert!(matches!(
        result,
        Err(FixtureError::Lifecycle { operation: "start", .. })
    ));
    assert_eq!(session.phase(), ScenarioPhase::Started);
    assert_eq!(reporter.sessions_started(), 1);
}

#[test]
fn test_configuration_frozen_after_start() {
    let (runner, reporter) = runner_with_reporter();
    let config = SharedConfiguration::new(ReporterConfig::for_testing());
    let session = runner
        .create_scenario_named("ManualSessionScenario", config.clone())
        .unwrap();

    // Caller may still adjust settings before start
    config
        .update(|c| c.release_stage = "staging".to_string())
        .unwrap();
    session.start_bugsnag().unwrap();

    assert!(config.is_frozen());
    assert!(matches!(
        config.update(|c| c.release_stage = "production".to_string()),
        Err(ConfigError::Frozen)
    ));

    let started = reporter.started_config().unwrap();
    assert_eq!(started.release_stage, "staging");
    assert!(!started.auto_track_sessions);
}

#[test]
fn test_invalid_config_aborts_start() {
    let (runner, reporter) = runner_with_reporter();
    let config = SharedConfiguration::new(ReporterConfig::default());
    let session = runner.create_scenario_named("NoOpScenario", config).unwrap();

    let result = session.start_bugsnag();

    assert!(matches!(
        result,
        Err(FixtureError::Reporter(ReporterError::InvalidConfiguration(
            ConfigError::InvalidApiKey { .. }
        )))
    ));
    assert!(!reporter.is_started());
    assert!(matches!(
        session.run(),
        Err(FixtureError::Lifecycle { operation: "run", .. })
    ));
}

#[test]
fn test_manual_session_scenario_lifecycle() {
    let (runner, reporter) = runner_with_reporter();

    let result = runner
        .execute(
            "ManualSessionScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
            &RunnerConfig::default(),
        )
        .unwrap();

    assert_eq!(result.phase, ScenarioPhase::Completed);
    assert_eq!(reporter.sessions_started(), 1);

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].session_id, reporter.current_session().map(|s| s.id));
}

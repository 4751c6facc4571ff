//! Background transitions delivered while a scenario runs.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fixture_core::config::{ReporterConfig, SharedConfiguration};
use fixture_core::reporter::SimulatedReporter;
use fixture_scenarios::builtin::background_mode::BACKGROUND_MODE;
use fixture_scenarios::{RunOutcome, ScenarioPhase, ScenarioRunner, global_registry};

#[test]
fn test_notification_from_other_thread_during_run() {
    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(global_registry(), reporter.clone());
    let session = runner
        .create_scenario_named(
            "BackgroundModeScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
        )
        .unwrap();
    session.start_bugsnag().unwrap();

    let notifier = session.background_notifier();
    let host = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        for _ in 0..3 {
            notifier.did_enter_background();
        }
    });

    let outcome = session.run().unwrap();
    host.join().unwrap();

    assert!(matches!(outcome, RunOutcome::Completed));
    assert_eq!(session.phase(), ScenarioPhase::Completed);
    assert_eq!(session.event_mode().get().as_deref(), Some(BACKGROUND_MODE));

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].message, "entered background during run");
}

#[test]
fn test_repeated_notifications_leave_default_mode_intact() {
    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(global_registry(), reporter);
    let session = runner
        .create_scenario_named(
            "NoOpScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
        )
        .unwrap();
    session.event_mode().set("normal");

    let notifier = session.background_notifier();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let notifier = notifier.clone();
            thread::spawn(move || notifier.did_enter_background())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    session.start_bugsnag().unwrap();
    session.run().unwrap();

    assert_eq!(session.event_mode().get().as_deref(), Some("normal"));
}

//! A deliberately faulting scenario from registration to recorded report.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fixture_core::config::{ReporterConfig, RunnerConfig, SharedConfiguration};
use fixture_core::reporter::{
    CrashReporter, ReportValue, ReportWriter, SimulatedReporter, UNHANDLED_KEY,
};
use fixture_scenarios::{
    RunOutcome, Scenario, ScenarioBase, ScenarioDescriptor, ScenarioError, ScenarioPhase,
    ScenarioRegistry, ScenarioRunner, global_registry, mark_error_handled_callback,
    start_reporter,
};

static HANDLER_CALLS: AtomicUsize = AtomicUsize::new(0);

fn counting_mark_handled(writer: &mut dyn ReportWriter) {
    HANDLER_CALLS.fetch_add(1, Ordering::SeqCst);
    mark_error_handled_callback(writer);
}

struct FaultingScenario {
    base: ScenarioBase,
}

impl Scenario for FaultingScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn start_bugsnag(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        self.config()
            .update(|c| c.on_crash_handler = Some(counting_mark_handled))?;
        start_reporter(self.config(), reporter)
    }

    fn run(&self, _reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        let values: Vec<u32> = Vec::new();
        std::hint::black_box(values[3]);
        Ok(())
    }
}

#[test]
fn test_registered_crash_scenario_marks_report_handled() {
    let mut registry = ScenarioRegistry::new();
    registry
        .register(ScenarioDescriptor::new(
            "CrashScenario",
            "indexes past the end of an empty vector",
            |config| {
                Box::new(FaultingScenario {
                    base: ScenarioBase::new(config),
                })
            },
        ))
        .unwrap();

    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(&registry, reporter.clone());
    let session = runner
        .create_scenario_named(
            "CrashScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
        )
        .unwrap();

    session.start_bugsnag().unwrap();
    assert_eq!(HANDLER_CALLS.load(Ordering::SeqCst), 0);

    let outcome = session.run().unwrap();

    assert_eq!(HANDLER_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(reporter.crash_callback_invocations(), 1);
    assert_eq!(session.phase(), ScenarioPhase::Crashed);

    let RunOutcome::Crashed { message, report } = outcome else {
        panic!("expected crash outcome");
    };
    assert!(message.contains("index out of bounds"), "{message}");

    let report = report.expect("crash report recorded");
    assert!(!report.unhandled);
    assert_eq!(
        report.elements.get(UNHANDLED_KEY),
        Some(&ReportValue::Boolean(false))
    );
    assert_eq!(reporter.reports().len(), 1);
}

#[test]
fn test_builtin_crash_scenario_end_to_end() {
    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(global_registry(), reporter.clone());

    let result = runner
        .execute(
            "CrashScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
            &RunnerConfig {
                event_mode: Some("crash".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(result.crashed());
    assert_eq!(result.event_mode.as_deref(), Some("crash"));
    assert_eq!(
        result.crash_message.as_deref(),
        Some(fixture_scenarios::builtin::crash::FAULT_MESSAGE)
    );
    assert_eq!(reporter.crash_callback_invocations(), 1);

    let report = result.crash_report.expect("crash report recorded");
    assert!(!report.unhandled);
    assert_eq!(report.session_id, reporter.current_session().map(|s| s.id));
    assert_eq!(reporter.current_session().unwrap().handled_count, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["elements"]["unhandled"], false);
}

#[test]
fn test_crash_with_disabled_stage_still_runs_callback() {
    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(global_registry(), reporter.clone());
    let config = ReporterConfig {
        enabled_release_stages: vec!["production".to_string()],
        ..ReporterConfig::for_testing()
    };

    let result = runner
        .execute(
            "CrashScenario",
            SharedConfiguration::new(config),
            &RunnerConfig::default(),
        )
        .unwrap();

    assert!(result.crashed());
    assert!(result.crash_report.is_none());
    assert_eq!(reporter.crash_callback_invocations(), 1);
    assert_eq!(reporter.suppressed_reports(), 1);
}

fn mark_handled_then_panic(writer: &mut dyn ReportWriter) {
    mark_error_handled_callback(writer);
    panic!("handler failed");
}

struct FaultingHandlerScenario {
    base: ScenarioBase,
}

impl Scenario for FaultingHandlerScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn start_bugsnag(&self, reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        self.config()
            .update(|c| c.on_crash_handler = Some(mark_handled_then_panic))?;
        start_reporter(self.config(), reporter)
    }

    fn run(&self, _reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        panic!("scenario fault");
    }
}

#[test]
fn test_panicking_crash_handler_is_contained() {
    let mut registry = ScenarioRegistry::new();
    registry
        .register(ScenarioDescriptor::new(
            "FaultingHandlerScenario",
            "faults while its on-crash handler also panics",
            |config| {
                Box::new(FaultingHandlerScenario {
                    base: ScenarioBase::new(config),
                })
            },
        ))
        .unwrap();

    let reporter = Arc::new(SimulatedReporter::new());
    let runner = ScenarioRunner::new(&registry, reporter.clone());
    let session = runner
        .create_scenario_named(
            "FaultingHandlerScenario",
            SharedConfiguration::new(ReporterConfig::for_testing()),
        )
        .unwrap();
    session.start_bugsnag().unwrap();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| session.run()))
        .expect("handler panic must not escape run")
        .unwrap();

    assert_eq!(session.phase(), ScenarioPhase::Crashed);
    assert_eq!(reporter.crash_callback_invocations(), 1);

    let RunOutcome::Crashed { message, report } = outcome else {
        panic!("expected crash outcome");
    };
    assert_eq!(message, "scenario fault");
    assert!(!report.expect("crash report recorded").unhandled);
}

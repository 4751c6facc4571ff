//! Scenario runner and result collection.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use fixture_core::FixtureError;
use fixture_core::config::{FixtureConfig, RunnerConfig, SharedConfiguration};
use fixture_core::reporter::{CrashReport, CrashReporter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::registry::ScenarioRegistry;
use crate::session::{RunOutcome, ScenarioPhase, ScenarioSession};

/// Resolves scenarios by name and drives them against one reporter.
pub struct ScenarioRunner<'r> {
    registry: &'r ScenarioRegistry,
    reporter: Arc<dyn CrashReporter>,
}

impl<'r> ScenarioRunner<'r> {
    /// Creates a runner over `registry` reporting to `reporter`.
    pub fn new(registry: &'r ScenarioRegistry, reporter: Arc<dyn CrashReporter>) -> Self {
        Self { registry, reporter }
    }

    pub fn reporter(&self) -> &Arc<dyn CrashReporter> {
        &self.reporter
    }

    /// Constructs the scenario registered under `name`.
    ///
    /// Construction only wires the scenario to `config`; the reporter is not
    /// started.
    ///
    /// # Errors
    ///
    /// - `FixtureError::UnknownScenario` - Nothing is registered under `name`
    pub fn create_scenario_named(
        &self,
        name: &str,
        config: SharedConfiguration,
    ) -> Result<ScenarioSession, FixtureError> {
        let factory = self.registry.resolve(name)?;
        let scenario = factory(config);
        info!("Constructed scenario {name}");
        Ok(ScenarioSession::new(
            name,
            Arc::from(scenario),
            Arc::clone(&self.reporter),
        ))
    }

    /// Runs the full lifecycle of `name`: construct, start, run.
    ///
    /// `runner.event_mode` is applied before the reporter starts. When
    /// `runner.background_after` is set, one background transition is
    /// delivered from a separate thread that long after `run` begins, unless
    /// `run` has already returned.
    ///
    /// # Errors
    ///
    /// - `FixtureError::UnknownScenario` - Nothing is registered under `name`
    /// - `FixtureError::Reporter` - The reporter refused to start
    /// - `FixtureError::ScenarioFailed` - Starting or running the scenario failed
    pub fn execute(
        &self,
        name: &str,
        config: SharedConfiguration,
        runner: &RunnerConfig,
    ) -> Result<ScenarioResult, FixtureError> {
        let started_at = Instant::now();
        let session = self.create_scenario_named(name, config)?;
        if let Some(mode) = &runner.event_mode {
            session.event_mode().set(mode.as_str());
        }

        session.start_bugsnag()?;
        let outcome = match runner.background_after {
            Some(delay) => run_with_background_transition(&session, delay)?,
            None => session.run()?,
        };

        let result =
            ScenarioResult::from_outcome(&session, outcome, started_at.elapsed().as_millis() as u64);
        if result.crashed() && result.crash_report.is_none() {
            warn!("Scenario {name} crashed but no report was recorded");
        }
        Ok(result)
    }
}

fn run_with_background_transition(
    session: &ScenarioSession,
    delay: Duration,
) -> Result<RunOutcome, FixtureError> {
    let notifier = session.background_notifier();
    let (finished, wait_for_finish) = mpsc::channel::<()>();

    thread::scope(|scope| {
        scope.spawn(move || match wait_for_finish.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => notifier.did_enter_background(),
            _ => debug!("Run finished before background transition"),
        });

        let outcome = session.run();
        drop(finished);
        outcome
    })
}

/// Summary of a single scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub phase: ScenarioPhase,
    pub event_mode: Option<String>,
    pub duration_ms: u64,
    pub crash_message: Option<String>,
    pub crash_report: Option<CrashReport>,
}

impl ScenarioResult {
    /// Builds a result from a finished session.
    pub fn from_outcome(session: &ScenarioSession, outcome: RunOutcome, duration_ms: u64) -> Self {
        let (crash_message, crash_report) = match outcome {
            RunOutcome::Completed => (None, None),
            RunOutcome::Crashed { message, report } => (Some(message), report),
        };

        Self {
            name: session.name().to_string(),
            phase: session.phase(),
            event_mode: session.event_mode().get(),
            duration_ms,
            crash_message,
            crash_report,
        }
    }

    pub fn crashed(&self) -> bool {
        self.phase == ScenarioPhase::Crashed
    }
}

/// Collection of results from multiple scenarios.
#[derive(Debug, Default, Serialize)]
pub struct ScenarioResults {
    results: HashMap<String, ScenarioResult>,
}

impl ScenarioResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every scenario in `names`, each against its own reporter.
    ///
    /// A reporter can only be started once, so `new_reporter` is called once
    /// per scenario. All names are resolved before anything runs.
    ///
    /// # Errors
    ///
    /// - `FixtureError::UnknownScenario` - A name is not registered; nothing ran
    /// - Any error from [`ScenarioRunner::execute`], which stops the batch
    pub fn run_all<S, F>(
        registry: &ScenarioRegistry,
        names: &[S],
        config: &FixtureConfig,
        mut new_reporter: F,
    ) -> Result<Self, FixtureError>
    where
        S: AsRef<str>,
        F: FnMut() -> Arc<dyn CrashReporter>,
    {
        for name in names {
            registry.resolve(name.as_ref())?;
        }

        let mut results = Self::new();
        for name in names {
            let runner = ScenarioRunner::new(registry, new_reporter());
            let config_handle = SharedConfiguration::new(config.reporter.clone());
            results.add_result(runner.execute(name.as_ref(), config_handle, &config.runner)?);
        }

        info!(
            "Ran {} scenario(s), {} crashed",
            results.results.len(),
            results.crashed_count()
        );
        Ok(results)
    }

    /// Add a scenario result under its name.
    pub fn add_result(&mut self, result: ScenarioResult) {
        self.results.insert(result.name.clone(), result);
    }

    /// Get a scenario result by name.
    pub fn get_result(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.get(name)
    }

    /// Get all scenario results.
    pub fn results(&self) -> &HashMap<String, ScenarioResult> {
        &self.results
    }

    /// Number of scenarios that ended in a crash.
    pub fn crashed_count(&self) -> usize {
        self.results.values().filter(|r| r.crashed()).count()
    }
}

#[cfg(test)]
mod tests {
    use fixture_core::config::ReporterConfig;
    use fixture_core::reporter::SimulatedReporter;

    use super::*;
    use crate::builtin::background_mode::BACKGROUND_MODE;

    fn shared_config() -> SharedConfiguration {
        SharedConfiguration::new(ReporterConfig::for_testing())
    }

    #[test]
    fn test_create_unknown_scenario() {
        let registry = ScenarioRegistry::with_builtins();
        let reporter = Arc::new(SimulatedReporter::new());
        let runner = ScenarioRunner::new(&registry, reporter.clone());

        let result = runner.create_scenario_named("Missing", shared_config());

        assert!(matches!(result, Err(FixtureError::UnknownScenario { .. })));
        assert!(!reporter.is_started());
    }

    #[test]
    fn test_construction_does_not_start_reporter() {
        let registry = ScenarioRegistry::with_builtins();
        let reporter = Arc::new(SimulatedReporter::new());
        let runner = ScenarioRunner::new(&registry, reporter.clone());
        let config = shared_config();

        let session = runner
            .create_scenario_named("NoOpScenario", config.clone())
            .unwrap();

        assert_eq!(session.phase(), ScenarioPhase::Constructed);
        assert!(session.config().ptr_eq(&config));
        assert_eq!(session.event_mode().get(), None);
        assert!(!reporter.is_started());
    }

    #[test]
    fn test_execute_applies_event_mode() {
        let registry = ScenarioRegistry::with_builtins();
        let runner = ScenarioRunner::new(&registry, Arc::new(SimulatedReporter::new()));

        let result = runner
            .execute(
                "NoOpScenario",
                shared_config(),
                &RunnerConfig {
                    event_mode: Some("normal".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(result.phase, ScenarioPhase::Completed);
        assert_eq!(result.event_mode.as_deref(), Some("normal"));
        assert!(!result.crashed());
        assert!(result.crash_report.is_none());
    }

    #[test]
    fn test_results_collection() {
        let registry = ScenarioRegistry::with_builtins();
        let mut results = ScenarioResults::new();

        for name in ["NoOpScenario", "CrashScenario"] {
            let runner = ScenarioRunner::new(&registry, Arc::new(SimulatedReporter::new()));
            results.add_result(
                runner
                    .execute(name, shared_config(), &RunnerConfig::default())
                    .unwrap(),
            );
        }

        assert_eq!(results.results().len(), 2);
        assert_eq!(results.crashed_count(), 1);
        assert!(results.get_result("CrashScenario").unwrap().crashed());
        assert!(results.get_result("Missing").is_none());
    }

    #[test]
    fn test_execute_delivers_background_transition() {
        let registry = ScenarioRegistry::with_builtins();
        let reporter = Arc::new(SimulatedReporter::new());
        let runner = ScenarioRunner::new(&registry, reporter.clone());
        let settings = RunnerConfig {
            event_mode: None,
            background_after: Some(Duration::from_millis(20)),
        };

        let result = runner
            .execute("BackgroundModeScenario", shared_config(), &settings)
            .unwrap();

        assert_eq!(result.phase, ScenarioPhase::Completed);
        assert_eq!(result.event_mode.as_deref(), Some(BACKGROUND_MODE));
        assert_eq!(reporter.reports().len(), 1);
    }

    #[test]
    fn test_background_transition_skipped_after_run_returns() {
        let registry = ScenarioRegistry::with_builtins();
        let runner = ScenarioRunner::new(&registry, Arc::new(SimulatedReporter::new()));
        let settings = RunnerConfig {
            event_mode: Some("normal".to_string()),
            background_after: Some(Duration::from_secs(30)),
        };

        let started = Instant::now();
        let result = runner
            .execute("NoOpScenario", shared_config(), &settings)
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(result.event_mode.as_deref(), Some("normal"));
    }

    #[test]
    fn test_run_all_uses_fresh_reporter_per_scenario() {
        let registry = ScenarioRegistry::with_builtins();
        let mut reporters: Vec<Arc<SimulatedReporter>> = Vec::new();

        let results = ScenarioResults::run_all(
            &registry,
            &["NoOpScenario", "CrashScenario", "HandledErrorScenario"],
            &FixtureConfig::for_testing(),
            || {
                let reporter = Arc::new(SimulatedReporter::new());
                reporters.push(reporter.clone());
                reporter
            },
        )
        .unwrap();

        assert_eq!(results.results().len(), 3);
        assert_eq!(results.crashed_count(), 1);
        assert!(results.get_result("CrashScenario").unwrap().crashed());
        assert_eq!(reporters.len(), 3);
        assert!(reporters.iter().all(|r| r.is_started()));
        assert_eq!(reporters[1].crash_callback_invocations(), 1);
    }

    #[test]
    fn test_run_all_rejects_unknown_name_before_running() {
        let registry = ScenarioRegistry::with_builtins();
        let mut created = 0;

        let result = ScenarioResults::run_all(
            &registry,
            &["NoOpScenario", "Missing"],
            &FixtureConfig::for_testing(),
            || {
                created += 1;
                Arc::new(SimulatedReporter::new())
            },
        );

        assert!(matches!(
            result,
            Err(FixtureError::UnknownScenario { ref name }) if name == "Missing"
        ));
        assert_eq!(created, 0);
    }
}

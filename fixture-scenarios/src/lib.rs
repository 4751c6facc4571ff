//! Fixture Scenarios - Named test cases for crash-reporter end-to-end runs.

#![warn(clippy::missing_errors_doc)]
//!
//! A harness picks a scenario by name, hands it a reporter configuration,
//! starts the crash reporter through it, and runs it. Scenarios exercise one
//! crash or error-handling condition each; some deliberately fault.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fixture_core::config::{ReporterConfig, SharedConfiguration};
//! use fixture_core::reporter::SimulatedReporter;
//! use fixture_scenarios::{ScenarioRunner, global_registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reporter = Arc::new(SimulatedReporter::new());
//! let runner = ScenarioRunner::new(global_registry(), reporter.clone());
//!
//! let config = SharedConfiguration::new(ReporterConfig::for_testing());
//! let session = runner.create_scenario_named("CrashScenario", config)?;
//! session.start_bugsnag()?;
//! let outcome = session.run()?;
//!
//! println!("{outcome:?}, reports: {}", reporter.reports().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Registry**: name to factory mapping, built once at startup
//! - **Session**: enforces start-before-run and captures faults from `run`
//! - **Runner**: resolves names and drives sessions to completion
//! - **Built-ins**: the scenarios shipped with the fixture

pub mod builtin;
pub mod callbacks;
pub mod registry;
pub mod runner;
pub mod scenario;
pub mod session;

pub use callbacks::mark_error_handled_callback;
pub use registry::{ScenarioDescriptor, ScenarioFactory, ScenarioRegistry, global_registry};
pub use runner::{ScenarioResult, ScenarioResults, ScenarioRunner};
pub use scenario::{EventMode, Scenario, ScenarioBase, ScenarioError, start_reporter};
pub use session::{BackgroundNotifier, RunOutcome, ScenarioPhase, ScenarioSession};

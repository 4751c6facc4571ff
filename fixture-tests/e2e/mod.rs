//! End-to-end tests for the scenario fixture
//!
//! Each test drives a scenario from registration through construction,
//! reporter start and run, then inspects what the reporter recorded.

mod background_notifications;
mod crash_scenario;
mod noop_scenario;

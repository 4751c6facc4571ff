//! Integration tests for the scenario fixture
//!
//! These tests exercise the public contracts between the registry, the
//! scenario sessions and the crash reporter.

#[path = "integration/registry_resolution.rs"]
mod registry_resolution;

#[path = "integration/lifecycle_ordering.rs"]
mod lifecycle_ordering;

//! Mapping from scenario names to the factories that build them.
//!
//! Names are registered once during startup and never removed. Registering a
//! name twice is rejected so the first registration always wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use fixture_core::FixtureError;
use fixture_core::config::SharedConfiguration;
use tracing::debug;

use crate::builtin::register_builtin_scenarios;
use crate::scenario::Scenario;

/// Builds a scenario around a caller-supplied configuration.
pub type ScenarioFactory = Arc<dyn Fn(SharedConfiguration) -> Box<dyn Scenario> + Send + Sync>;

/// A registered scenario: its name, a short description, and its factory.
#[derive(Clone)]
pub struct ScenarioDescriptor {
    name: String,
    description: String,
    factory: ScenarioFactory,
}

impl ScenarioDescriptor {
    /// Creates a descriptor for `name`.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, factory: F) -> Self
    where
        F: Fn(SharedConfiguration) -> Box<dyn Scenario> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn factory(&self) -> &ScenarioFactory {
        &self.factory
    }
}

impl fmt::Debug for ScenarioDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Name-to-factory registry for scenarios.
#[derive(Debug, Default)]
pub struct ScenarioRegistry {
    entries: HashMap<String, ScenarioDescriptor>,
}

impl ScenarioRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in scenario.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtin_scenarios(&mut registry);
        registry
    }

    /// Adds a scenario.
    ///
    /// # Errors
    ///
    /// - `FixtureError::DuplicateScenario` - The name is already registered
    pub fn register(&mut self, descriptor: ScenarioDescriptor) -> Result<(), FixtureError> {
        if self.entries.contains_key(descriptor.name()) {
            return Err(FixtureError::DuplicateScenario {
                name: descriptor.name,
            });
        }

        debug!("Registered scenario {}", descriptor.name);
        self.entries.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Looks up the factory registered under `name`.
    ///
    /// # Errors
    ///
    /// - `FixtureError::UnknownScenario` - Nothing is registered under `name`
    pub fn resolve(&self, name: &str) -> Result<&ScenarioFactory, FixtureError> {
        self.entries
            .get(name)
            .map(ScenarioDescriptor::factory)
            .ok_or_else(|| FixtureError::UnknownScenario {
                name: name.to_string(),
            })
    }

    /// Returns the descriptor registered under `name`.
    pub fn descriptor(&self, name: &str) -> Option<&ScenarioDescriptor> {
        self.entries.get(name)
    }

    /// Returns all registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns all descriptors sorted by name.
    pub fn descriptors(&self) -> Vec<&ScenarioDescriptor> {
        let mut descriptors: Vec<_> = self.entries.values().collect();
        descriptors.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide registry of built-in scenarios, built on first use.
pub fn global_registry() -> &'static ScenarioRegistry {
    static REGISTRY: OnceLock<ScenarioRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ScenarioRegistry::with_builtins)
}

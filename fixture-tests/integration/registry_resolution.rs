//! Name resolution through the public registry API.

use std::sync::Arc;

use fixture_core::FixtureError;
use fixture_core::config::{ReporterConfig, SharedConfiguration};
use fixture_core::reporter::CrashReporter;
use fixture_scenarios::{
    Scenario, ScenarioBase, ScenarioDescriptor, ScenarioError, ScenarioRegistry, global_registry,
};
use proptest::prelude::*;

struct NamedScenario {
    base: ScenarioBase,
}

impl Scenario for NamedScenario {
    fn base(&self) -> &ScenarioBase {
        &self.base
    }

    fn run(&self, _reporter: &dyn CrashReporter) -> Result<(), ScenarioError> {
        Ok(())
    }
}

fn descriptor(name: &str) -> ScenarioDescriptor {
    ScenarioDescriptor::new(name, "integration scenario", |config| {
        Box::new(NamedScenario {
            base: ScenarioBase::new(config),
        })
    })
}

#[test]
fn test_builtin_names_resolve_with_config_identity() {
    let registry = global_registry();

    for name in registry.names() {
        let config = SharedConfiguration::new(ReporterConfig::for_testing());
        let factory = registry.resolve(name).unwrap();
        let scenario = factory(config.clone());

        assert!(scenario.config().ptr_eq(&config), "{name} copied its config");
        assert_eq!(scenario.event_mode().get(), None, "{name} preset event mode");
    }
}

#[test]
fn test_unknown_name_never_yields_scenario() {
    let registry = global_registry();

    for name in ["", "crashscenario", "CrashScenario ", "Scenario"] {
        match registry.resolve(name) {
            Err(FixtureError::UnknownScenario { name: reported }) => assert_eq!(reported, name),
            Err(other) => panic!("unexpected error for {name:?}: {other}"),
            Ok(_) => panic!("resolved unregistered name {name:?}"),
        }
    }
}

#[test]
fn test_custom_registry_rejects_builtin_collision() {
    let mut registry = ScenarioRegistry::with_builtins();
    let before = Arc::clone(registry.resolve("CrashScenario").unwrap());

    let result = registry.register(descriptor("CrashScenario"));

    assert!(matches!(result, Err(FixtureError::DuplicateScenario { .. })));
    assert!(Arc::ptr_eq(&before, registry.resolve("CrashScenario").unwrap()));
}

proptest! {
    #[test]
    fn prop_unregistered_names_fail(name in "[a-z]{1,24}") {
        let mut registry = ScenarioRegistry::new();
        registry.register(descriptor("Registered")).unwrap();

        let is_unknown = matches!(
            registry.resolve(&name),
            Err(FixtureError::UnknownScenario { .. })
        );
        prop_assert!(is_unknown);
    }
}

//! Built-in scenarios shipped with the fixture.
//!
//! Each scenario module exposes a `descriptor()`; [`register_builtin_scenarios`]
//! is the single place they are registered at startup.

pub mod background_mode;
pub mod crash;
pub mod handled_error;
pub mod manual_session;
pub mod no_op;

pub use background_mode::BackgroundModeScenario;
pub use crash::CrashScenario;
pub use handled_error::HandledErrorScenario;
pub use manual_session::ManualSessionScenario;
pub use no_op::NoOpScenario;
use tracing::error;

use crate::registry::{ScenarioDescriptor, ScenarioRegistry};

/// Descriptors for every built-in scenario.
pub fn builtin_descriptors() -> Vec<ScenarioDescriptor> {
    vec![
        background_mode::descriptor(),
        crash::descriptor(),
        handled_error::descriptor(),
        manual_session::descriptor(),
        no_op::descriptor(),
    ]
}

/// Registers every built-in scenario with `registry`.
///
/// Names already present are left untouched and logged.
pub fn register_builtin_scenarios(registry: &mut ScenarioRegistry) {
    for descriptor in builtin_descriptors() {
        if let Err(e) = registry.register(descriptor) {
            error!("Skipping built-in scenario: {e}");
        }
    }
}

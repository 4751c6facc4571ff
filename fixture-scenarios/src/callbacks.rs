//! Callbacks installed as the reporter's on-crash handler.
//!
//! These run while a crash report is being written: no allocation, no locks,
//! no access to scenario state.

use fixture_core::reporter::{ReportWriter, UNHANDLED_KEY};

/// Marks the crash report being written as a handled error.
pub fn mark_error_handled_callback(writer: &mut dyn ReportWriter) {
    writer.add_boolean_element(UNHANDLED_KEY, false);
}

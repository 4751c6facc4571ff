//! Crash-time report writer.
//!
//! Code handed a [`ReportWriter`] runs while a crash report is being written
//! and may be interrupting arbitrary normal-path code. Writers therefore never
//! allocate and never lock; [`FixedReportWriter`] keeps its elements in an
//! inline array and silently drops writes past its capacity.

use serde::Serialize;

/// Maximum number of elements a [`FixedReportWriter`] holds.
pub const WRITER_CAPACITY: usize = 16;

/// Callback invoked by the reporter while it writes a crash report.
///
/// Must be stateless, allocation-free and must not panic.
pub type OnCrashHandler = fn(&mut dyn ReportWriter);

/// Write handle into an in-progress crash report.
pub trait ReportWriter {
    /// Sets a boolean element, replacing any earlier value for `key`.
    fn add_boolean_element(&mut self, key: &'static str, value: bool);

    /// Sets an integer element, replacing any earlier value for `key`.
    fn add_integer_element(&mut self, key: &'static str, value: i64);

    /// Sets a string element, replacing any earlier value for `key`.
    fn add_string_element(&mut self, key: &'static str, value: &'static str);
}

/// Value of a single report element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Boolean(bool),
    Integer(i64),
    String(&'static str),
}

/// Fixed-capacity, stack-resident report writer.
#[derive(Debug, Clone)]
pub struct FixedReportWriter {
    elements: [Option<(&'static str, ReportValue)>; WRITER_CAPACITY],
    len: usize,
    dropped: usize,
}

impl Default for FixedReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedReportWriter {
    /// Creates an empty writer.
    pub const fn new() -> Self {
        Self {
            elements: [None; WRITER_CAPACITY],
            len: 0,
            dropped: 0,
        }
    }

    fn set(&mut self, key: &'static str, value: ReportValue) {
        for (existing_key, existing_value) in self.elements[..self.len].iter_mut().flatten() {
            if *existing_key == key {
                *existing_value = value;
                return;
            }
        }

        if self.len < WRITER_CAPACITY {
            self.elements[self.len] = Some((key, value));
            self.len += 1;
        } else {
            self.dropped += 1;
        }
    }

    /// Returns the value written for `key`.
    pub fn get(&self, key: &str) -> Option<ReportValue> {
        self.iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value)
    }

    /// Returns the boolean written for `key`, if it is a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(ReportValue::Boolean(value)) => Some(value),
            _ => None,
        }
    }

    /// Iterates over elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ReportValue)> + '_ {
        self.elements[..self.len].iter().flatten().copied()
    }

    /// Number of distinct elements written.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of writes discarded because the writer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl ReportWriter for FixedReportWriter {
    fn add_boolean_element(&mut self, key: &'static str, value: bool) {
        self.set(key, ReportValue::Boolean(value));
    }

    fn add_integer_element(&mut self, key: &'static str, value: i64) {
        self.set(key, ReportValue::Integer(value));
    }

    fn add_string_element(&mut self, key: &'static str, value: &'static str) {
        self.set(key, ReportValue::String(value));
    }
}

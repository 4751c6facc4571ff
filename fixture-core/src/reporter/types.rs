//! Report and session types recorded by crash reporters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::writer::{FixedReportWriter, ReportValue};

/// Report element marking whether the error was unhandled.
pub const UNHANDLED_KEY: &str = "unhandled";

/// Report element carrying the severity label.
pub const SEVERITY_KEY: &str = "severity";

/// Severity attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Returns the wire label for this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Error reported explicitly by scenario code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledError {
    pub error_class: String,
    pub message: String,
}

impl HandledError {
    /// Creates a handled error with the given class and message.
    pub fn new(error_class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_class: error_class.into(),
            message: message.into(),
        }
    }
}

/// Report recorded by a crash reporter.
#[derive(Debug, Clone, Serialize)]
pub struct CrashReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub error_class: String,
    pub message: String,
    pub unhandled: bool,
    pub severity: Severity,
    pub release_stage: String,
    pub app_version: Option<String>,
    pub session_id: Option<Uuid>,
    pub elements: BTreeMap<&'static str, ReportValue>,
}

impl CrashReport {
    /// Builds a report from the elements written at crash time.
    ///
    /// `unhandled` defaults to true unless the writer recorded otherwise.
    pub(crate) fn from_writer(
        writer: &FixedReportWriter,
        error_class: &str,
        message: &str,
        release_stage: &str,
        app_version: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            error_class: error_class.to_string(),
            message: message.to_string(),
            unhandled: writer.get_bool(UNHANDLED_KEY).unwrap_or(true),
            severity: Severity::Error,
            release_stage: release_stage.to_string(),
            app_version: app_version.map(str::to_string),
            session_id: None,
            elements: writer.iter().collect(),
        }
    }
}

/// Session tracked by a crash reporter.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub handled_count: u32,
    pub unhandled_count: u32,
}

impl Session {
    pub(crate) fn begin() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            handled_count: 0,
            unhandled_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::ReportWriter;

    #[test]
    fn test_report_defaults_to_unhandled() {
        let writer = FixedReportWriter::new();
        let report = CrashReport::from_writer(&writer, "panic", "boom", "development", None);

        assert!(report.unhandled);
        assert_eq!(report.severity, Severity::Error);
        assert!(report.elements.is_empty());
    }

    #[test]
    fn test_report_respects_handled_marker() {
        let mut writer = FixedReportWriter::new();
        writer.add_boolean_element(UNHANDLED_KEY, false);
        let report =
            CrashReport::from_writer(&writer, "panic", "boom", "production", Some("1.2.3"));

        assert!(!report.unhandled);
        assert_eq!(report.app_version.as_deref(), Some("1.2.3"));
        assert_eq!(
            report.elements.get(UNHANDLED_KEY),
            Some(&ReportValue::Boolean(false))
        );
    }

    #[test]
    fn test_report_serializes_severity_lowercase() {
        let writer = FixedReportWriter::new();
        let report = CrashReport::from_writer(&writer, "panic", "boom", "development", None);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["severity"], "error");
        assert_eq!(json["unhandled"], true);
    }
}

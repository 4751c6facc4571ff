//! In-process crash reporter used in place of the real SDK.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{CrashReport, HandledError, SEVERITY_KEY, Session, Severity, UNHANDLED_KEY};
use super::writer::{FixedReportWriter, ReportWriter};
use super::{CrashReporter, ReporterError};
use crate::config::ReporterConfig;

/// Error class recorded for captured faults.
const CRASH_ERROR_CLASS: &str = "panic";

/// Crash reporter that records reports in memory.
///
/// Mirrors the observable contract of the SDK: it must be started with a
/// valid configuration, honours release-stage filtering and session tracking,
/// and invokes the on-crash handler while writing crash reports.
#[derive(Debug, Default)]
pub struct SimulatedReporter {
    state: Mutex<ReporterState>,
    crash_callback_invocations: AtomicUsize,
}

#[derive(Debug, Default)]
struct ReporterState {
    config: Option<ReporterConfig>,
    session: Option<Session>,
    sessions_started: usize,
    reports: Vec<CrashReport>,
    suppressed: usize,
}

impl ReporterState {
    fn begin_session(&mut self) -> Uuid {
        let session = Session::begin();
        let id = session.id;
        self.session = Some(session);
        self.sessions_started += 1;
        id
    }

    fn record(&mut self, mut report: CrashReport, deliver: bool) -> Option<CrashReport> {
        if !deliver {
            self.suppressed += 1;
            debug!(
                "Suppressed report for release stage {}",
                report.release_stage
            );
            return None;
        }

        if let Some(session) = self.session.as_mut() {
            if report.unhandled {
                session.unhandled_count += 1;
            } else {
                session.handled_count += 1;
            }
            report.session_id = Some(session.id);
        }

        self.reports.push(report.clone());
        Some(report)
    }
}

impl SimulatedReporter {
    /// Creates an unstarted reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every report recorded so far.
    pub fn reports(&self) -> Vec<CrashReport> {
        self.state.lock().reports.clone()
    }

    /// Returns the number of times the on-crash handler ran.
    pub fn crash_callback_invocations(&self) -> usize {
        self.crash_callback_invocations.load(Ordering::SeqCst)
    }

    /// Returns the number of sessions started, automatic or manual.
    pub fn sessions_started(&self) -> usize {
        self.state.lock().sessions_started
    }

    /// Returns the current session, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.state.lock().session.clone()
    }

    /// Returns the number of reports dropped by release-stage filtering.
    pub fn suppressed_reports(&self) -> usize {
        self.state.lock().suppressed
    }

    /// Returns the configuration the reporter was started with.
    pub fn started_config(&self) -> Option<ReporterConfig> {
        self.state.lock().config.clone()
    }
}

impl CrashReporter for SimulatedReporter {
    fn start(&self, config: &ReporterConfig) -> Result<(), ReporterError> {
        let mut state = self.state.lock();
        if state.config.is_some() {
            return Err(ReporterError::AlreadyStarted);
        }

        config.validate()?;

        state.config = Some(config.clone());
        if config.auto_track_sessions {
            state.begin_session();
        }

        info!(
            "Reporter started: release_stage={}, auto_sessions={}, on_crash_handler={}",
            config.release_stage,
            config.auto_track_sessions,
            config.on_crash_handler.is_some()
        );
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.state.lock().config.is_some()
    }

    fn notify(&self, error: HandledError) -> Result<(), ReporterError> {
        let mut state = self.state.lock();
        let config = state.config.as_ref().ok_or(ReporterError::NotStarted)?;

        let mut writer = FixedReportWriter::new();
        writer.add_boolean_element(UNHANDLED_KEY, false);
        writer.add_string_element(SEVERITY_KEY, Severity::Warning.as_str());

        let mut report = CrashReport::from_writer(
            &writer,
            &error.error_class,
            &error.message,
            &config.release_stage,
            config.app_version.as_deref(),
        );
        report.severity = Severity::Warning;
        let deliver = config.should_notify_release_stage();

        debug!("Handled error notified: {}", error.error_class);
        state.record(report, deliver);
        Ok(())
    }

    fn start_session(&self) -> Result<Uuid, ReporterError> {
        let mut state = self.state.lock();
        if state.config.is_none() {
            return Err(ReporterError::NotStarted);
        }
        let id = state.begin_session();
        debug!("Session started: {id}");
        Ok(id)
    }

    fn capture_crash(&self, message: &str) -> Option<CrashReport> {
        // Copy what crash-time code needs and release the lock before the
        // handler runs.
        let config = {
            let state = self.state.lock();
            match state.config.as_ref() {
                Some(config) if config.auto_detect_errors => config.clone(),
                Some(_) => {
                    debug!("Fault ignored: automatic error detection disabled");
                    return None;
                }
                None => {
                    warn!("Fault occurred before reporter was started");
                    return None;
                }
            }
        };

        let mut writer = FixedReportWriter::new();
        writer.add_boolean_element(UNHANDLED_KEY, true);
        writer.add_string_element(SEVERITY_KEY, Severity::Error.as_str());

        if let Some(handler) = config.on_crash_handler {
            let handled = panic::catch_unwind(AssertUnwindSafe(|| handler(&mut writer)));
            self.crash_callback_invocations
                .fetch_add(1, Ordering::SeqCst);
            if handled.is_err() {
                warn!("On-crash handler panicked; keeping report as written");
            }
        }

        let report = CrashReport::from_writer(
            &writer,
            CRASH_ERROR_CLASS,
            message,
            &config.release_stage,
            config.app_version.as_deref(),
        );

        info!(
            "Crash captured: unhandled={}, elements={}",
            report.unhandled,
            writer.len()
        );

        self.state
            .lock()
            .record(report, config.should_notify_release_stage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::reporter::ReportValue;

    fn tag_callback(writer: &mut dyn ReportWriter) {
        writer.add_string_element("tag", "written-at-crash-time");
    }

    fn panicking_callback(writer: &mut dyn ReportWriter) {
        writer.add_string_element("tag", "partial");
        panic!("handler failed");
    }

    #[test]
    fn test_start_requires_valid_config() {
        let reporter = SimulatedReporter::new();
        let result = reporter.start(&ReporterConfig::default());

        assert!(matches!(
            result,
            Err(ReporterError::InvalidConfiguration(ConfigError::InvalidApiKey { .. }))
        ));
        assert!(!reporter.is_started());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let reporter = SimulatedReporter::new();
        let config = ReporterConfig::for_testing();

        reporter.start(&config).unwrap();
        assert!(matches!(
            reporter.start(&config),
            Err(ReporterError::AlreadyStarted)
        ));
    }

    #[test]
    fn test_auto_session_tracking() {
        let reporter = SimulatedReporter::new();
        reporter.start(&ReporterConfig::for_testing()).unwrap();
        assert_eq!(reporter.sessions_started(), 1);

        let reporter = SimulatedReporter::new();
        let config = ReporterConfig {
            auto_track_sessions: false,
            ..ReporterConfig::for_testing()
        };
        reporter.start(&config).unwrap();
        assert_eq!(reporter.sessions_started(), 0);
        assert!(reporter.current_session().is_none());
    }

    #[test]
    fn test_unstarted_reporter_ignores_everything() {
        let reporter = SimulatedReporter::new();

        assert!(reporter.capture_crash("boom").is_none());
        assert!(matches!(
            reporter.notify(HandledError::new("Error", "oops")),
            Err(ReporterError::NotStarted)
        ));
        assert!(matches!(
            reporter.start_session(),
            Err(ReporterError::NotStarted)
        ));
        assert!(reporter.reports().is_empty());
    }

    #[test]
    fn test_crash_invokes_handler_once() {
        let reporter = SimulatedReporter::new();
        let config = ReporterConfig {
            on_crash_handler: Some(tag_callback),
            ..ReporterConfig::for_testing()
        };
        reporter.start(&config).unwrap();

        let report = reporter.capture_crash("boom").unwrap();

        assert_eq!(reporter.crash_callback_invocations(), 1);
        assert!(report.unhandled);
        assert_eq!(
            report.elements.get("tag"),
            Some(&ReportValue::String("written-at-crash-time"))
        );
        assert_eq!(report.session_id, reporter.current_session().map(|s| s.id));
        assert_eq!(reporter.current_session().unwrap().unhandled_count, 1);
    }

    #[test]
    fn test_panicking_handler_keeps_report() {
        let reporter = SimulatedReporter::new();
        let config = ReporterConfig {
            on_crash_handler: Some(panicking_callback),
            ..ReporterConfig::for_testing()
        };
        reporter.start(&config).unwrap();

        let report = reporter.capture_crash("boom").unwrap();

        assert_eq!(reporter.crash_callback_invocations(), 1);
        assert!(report.unhandled);
        assert_eq!(
            report.elements.get("tag"),
            Some(&ReportValue::String("partial"))
        );
        assert_eq!(reporter.reports().len(), 1);
    }

    #[test]
    fn test_crash_without_handler() {
        let reporter = SimulatedReporter::new();
        reporter.start(&ReporterConfig::for_testing()).unwrap();

        let report = reporter.capture_crash("boom").unwrap();
        assert_eq!(reporter.crash_callback_invocations(), 0);
        assert_eq!(report.message, "boom");
        assert_eq!(report.error_class, "panic");
    }

    #[test]
    fn test_auto_detect_disabled_ignores_crash() {
        let reporter = SimulatedReporter::new();
        let config = ReporterConfig {
            auto_detect_errors: false,
            on_crash_handler: Some(tag_callback),
            ..ReporterConfig::for_testing()
        };
        reporter.start(&config).unwrap();

        assert!(reporter.capture_crash("boom").is_none());
        assert_eq!(reporter.crash_callback_invocations(), 0);
    }

    #[test]
    fn test_release_stage_suppression() {
        let reporter = SimulatedReporter::new();
        let config = ReporterConfig {
            release_stage: "development".to_string(),
            enabled_release_stages: vec!["production".to_string()],
            on_crash_handler: Some(tag_callback),
            ..ReporterConfig::for_testing()
        };
        reporter.start(&config).unwrap();

        assert!(reporter.capture_crash("boom").is_none());
        reporter.notify(HandledError::new("Error", "oops")).unwrap();

        assert_eq!(reporter.crash_callback_invocations(), 1);
        assert_eq!(reporter.suppressed_reports(), 2);
        assert!(reporter.reports().is_empty());
    }

    #[test]
    fn test_notify_records_handled_warning() {
        let reporter = SimulatedReporter::new();
        reporter.start(&ReporterConfig::for_testing()).unwrap();
        reporter
            .notify(HandledError::new("NSRangeException", "index out of bounds"))
            .unwrap();

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].unhandled);
        assert_eq!(reports[0].severity, Severity::Warning);
        assert_eq!(reports[0].error_class, "NSRangeException");
        assert_eq!(reporter.current_session().unwrap().handled_count, 1);
    }

    #[test]
    fn test_manual_session_replaces_current() {
        let reporter = SimulatedReporter::new();
        reporter.start(&ReporterConfig::for_testing()).unwrap();
        let first = reporter.current_session().unwrap().id;

        let second = reporter.start_session().unwrap();
        assert_ne!(first, second);
        assert_eq!(reporter.sessions_started(), 2);
    }
}

//! Centralized configuration for fixture runs.
//!
//! The reporter configuration is the settings bag handed to a scenario at
//! construction and consumed by the crash reporter when it starts. Harness
//! settings (logging, runner defaults) live alongside it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::reporter::OnCrashHandler;

/// Length of a valid reporter API key in hex characters.
const API_KEY_LENGTH: usize = 32;

/// Upper bound accepted for `max_breadcrumbs`.
const MAX_BREADCRUMBS_LIMIT: usize = 500;

/// API key used by fixtures that point at the local mock server.
pub const TEST_API_KEY: &str = "12312312312312312312312312312312";

/// Errors raised while building or mutating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration is frozen after the reporter started")]
    Frozen,

    #[error("Invalid API key: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Central configuration for a fixture process.
///
/// Groups the reporter settings handed to scenarios with the harness-level
/// runner and logging settings. Supports environment variable overrides.
#[derive(Debug, Clone, Default)]
pub struct FixtureConfig {
    pub reporter: ReporterConfig,
    pub runner: RunnerConfig,
    pub logging: LoggingConfig,
}

/// Settings consumed by the crash reporter at start time.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Project API key, 32 hex characters
    pub api_key: String,
    /// Endpoint error reports are delivered to
    pub notify_endpoint: String,
    /// Endpoint session payloads are delivered to
    pub sessions_endpoint: String,
    /// Release stage attached to every report
    pub release_stage: String,
    /// Release stages allowed to deliver reports (empty = all)
    pub enabled_release_stages: Vec<String>,
    /// Application version attached to every report
    pub app_version: Option<String>,
    /// Capture unhandled faults automatically
    pub auto_detect_errors: bool,
    /// Start a session automatically when the reporter starts
    pub auto_track_sessions: bool,
    /// Maximum breadcrumbs retained per report
    pub max_breadcrumbs: usize,
    /// Callback invoked while a crash report is being written
    pub on_crash_handler: Option<OnCrashHandler>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            notify_endpoint: "https://notify.bugsnag.com".to_string(),
            sessions_endpoint: "https://sessions.bugsnag.com".to_string(),
            release_stage: "development".to_string(),
            enabled_release_stages: Vec::new(),
            app_version: None,
            auto_detect_errors: true,
            auto_track_sessions: true,
            max_breadcrumbs: 100,
            on_crash_handler: None,
        }
    }
}

impl ReporterConfig {
    /// Creates a configuration pointed at the local mock server.
    pub fn for_testing() -> Self {
        Self {
            api_key: TEST_API_KEY.to_string(),
            notify_endpoint: "http://localhost:9339/notify".to_string(),
            sessions_endpoint: "http://localhost:9339/sessions".to_string(),
            ..Default::default()
        }
    }

    /// Checks that the configuration is complete enough to start a reporter.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidApiKey` - Key is missing, wrong length, or not hex
    /// - `ConfigError::InvalidValue` - An endpoint or limit is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.len() != API_KEY_LENGTH {
            return Err(ConfigError::InvalidApiKey {
                reason: format!(
                    "expected {API_KEY_LENGTH} characters, got {}",
                    self.api_key.len()
                ),
            });
        }
        if !self.api_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidApiKey {
                reason: "must contain only hex characters".to_string(),
            });
        }

        for (field, endpoint) in [
            ("notify_endpoint", &self.notify_endpoint),
            ("sessions_endpoint", &self.sessions_endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("'{endpoint}' is not an http(s) URL"),
                });
            }
        }

        if self.max_breadcrumbs > MAX_BREADCRUMBS_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "max_breadcrumbs",
                reason: format!("must be at most {MAX_BREADCRUMBS_LIMIT}"),
            });
        }

        Ok(())
    }

    /// Returns whether reports for the configured release stage are delivered.
    pub fn should_notify_release_stage(&self) -> bool {
        self.enabled_release_stages.is_empty()
            || self
                .enabled_release_stages
                .iter()
                .any(|stage| stage == &self.release_stage)
    }
}

/// Scenario runner defaults.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Event mode assigned to a scenario before it starts
    pub event_mode: Option<String>,
    /// Deliver a background transition this long after `run` begins
    pub background_after: Option<Duration>,
}

/// Log output configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory the full trace log is written to
    pub logs_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl FixtureConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        let mut config = Self {
            reporter: ReporterConfig::for_testing(),
            ..Default::default()
        };

        if let Ok(api_key) = std::env::var("FIXTURE_API_KEY") {
            config.reporter.api_key = api_key;
        }

        if let Ok(stage) = std::env::var("FIXTURE_RELEASE_STAGE") {
            config.reporter.release_stage = stage;
        }

        if let Ok(endpoint) = std::env::var("FIXTURE_NOTIFY_ENDPOINT") {
            config.reporter.notify_endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("FIXTURE_SESSIONS_ENDPOINT") {
            config.reporter.sessions_endpoint = endpoint;
        }

        if let Ok(enabled) = std::env::var("FIXTURE_AUTO_TRACK_SESSIONS") {
            config.reporter.auto_track_sessions = enabled.parse().unwrap_or(true);
        }

        if let Ok(mode) = std::env::var("FIXTURE_EVENT_MODE") {
            if !mode.is_empty() {
                config.runner.event_mode = Some(mode);
            }
        }

        if let Ok(dir) = std::env::var("FIXTURE_LOGS_DIR") {
            if !dir.is_empty() {
                config.logging.logs_dir = PathBuf::from(dir);
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            reporter: ReporterConfig::for_testing(),
            ..Default::default()
        }
    }
}

/// Reporter configuration shared between the harness and a scenario.
///
/// Clones refer to the same underlying settings. Mutation is allowed until
/// [`freeze`](Self::freeze) is called, which happens once the reporter has
/// started.
#[derive(Debug, Clone)]
pub struct SharedConfiguration {
    inner: Arc<RwLock<ConfigurationState>>,
}

#[derive(Debug)]
struct ConfigurationState {
    config: ReporterConfig,
    frozen: bool,
}

impl SharedConfiguration {
    /// Wraps a configuration for sharing.
    pub fn new(config: ReporterConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ConfigurationState {
                config,
                frozen: false,
            })),
        }
    }

    /// Returns a copy of the current settings.
    pub fn snapshot(&self) -> ReporterConfig {
        self.inner.read().config.clone()
    }

    /// Reads the settings without copying them.
    pub fn read<R>(&self, f: impl FnOnce(&ReporterConfig) -> R) -> R {
        f(&self.inner.read().config)
    }

    /// Mutates the settings.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Frozen` - The reporter has already started
    pub fn update<R>(&self, f: impl FnOnce(&mut ReporterConfig) -> R) -> Result<R, ConfigError> {
        let mut state = self.inner.write();
        if state.frozen {
            return Err(ConfigError::Frozen);
        }
        Ok(f(&mut state.config))
    }

    /// Rejects all further mutation.
    pub fn freeze(&self) {
        self.inner.write().frozen = true;
    }

    /// Returns whether the configuration has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.inner.read().frozen
    }

    /// Returns true when both handles refer to the same configuration.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<ReporterConfig> for SharedConfiguration {
    fn from(config: ReporterConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = FixtureConfig::default();

        assert!(config.reporter.api_key.is_empty());
        assert!(config.reporter.auto_detect_errors);
        assert!(config.reporter.auto_track_sessions);
        assert_eq!(config.reporter.release_stage, "development");
        assert_eq!(config.reporter.max_breadcrumbs, 100);
        assert!(config.reporter.on_crash_handler.is_none());
        assert!(config.runner.event_mode.is_none());
        assert_eq!(config.logging.logs_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_default_reporter_config_is_incomplete() {
        let result = ReporterConfig::default().validate();
        assert!(matches!(result, Err(ConfigError::InvalidApiKey { .. })));
    }

    #[test]
    fn test_testing_preset_validates() {
        let config = ReporterConfig::for_testing();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_key, TEST_API_KEY);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ReporterConfig::for_testing();
        config.api_key = "z".repeat(32);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidApiKey { .. })
        ));

        let mut config = ReporterConfig::for_testing();
        config.notify_endpoint = "localhost:9339".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "notify_endpoint",
                ..
            })
        ));

        let mut config = ReporterConfig::for_testing();
        config.max_breadcrumbs = 501;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "max_breadcrumbs",
                ..
            })
        ));
    }

    #[test]
    fn test_release_stage_filtering() {
        let mut config = ReporterConfig::for_testing();
        assert!(config.should_notify_release_stage());

        config.enabled_release_stages = vec!["production".to_string()];
        assert!(!config.should_notify_release_stage());

        config.release_stage = "production".to_string();
        assert!(config.should_notify_release_stage());
    }

    #[test]
    fn test_shared_configuration_identity() {
        let shared = SharedConfiguration::new(ReporterConfig::for_testing());
        let clone = shared.clone();
        let other = SharedConfiguration::new(ReporterConfig::for_testing());

        assert!(shared.ptr_eq(&clone));
        assert!(!shared.ptr_eq(&other));

        clone
            .update(|c| c.release_stage = "staging".to_string())
            .unwrap();
        assert_eq!(shared.read(|c| c.release_stage.clone()), "staging");
    }

    #[test]
    fn test_frozen_configuration_rejects_updates() {
        let shared = SharedConfiguration::new(ReporterConfig::for_testing());
        assert!(!shared.is_frozen());

        shared.freeze();
        assert!(shared.is_frozen());

        let result = shared.update(|c| c.auto_track_sessions = false);
        assert!(matches!(result, Err(ConfigError::Frozen)));
        assert!(shared.snapshot().auto_track_sessions);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("FIXTURE_API_KEY", "abcdefabcdefabcdefabcdefabcdefab");
            std::env::set_var("FIXTURE_RELEASE_STAGE", "staging");
            std::env::set_var("FIXTURE_AUTO_TRACK_SESSIONS", "false");
            std::env::set_var("FIXTURE_EVENT_MODE", "recover");
            std::env::set_var("FIXTURE_LOGS_DIR", "/tmp/fixture-logs");
        }

        let config = FixtureConfig::from_env();

        assert_eq!(config.reporter.api_key, "abcdefabcdefabcdefabcdefabcdefab");
        assert_eq!(config.reporter.release_stage, "staging");
        assert!(!config.reporter.auto_track_sessions);
        assert_eq!(config.runner.event_mode.as_deref(), Some("recover"));
        assert_eq!(config.logging.logs_dir, PathBuf::from("/tmp/fixture-logs"));

        // Cleanup
        unsafe {
            std::env::remove_var("FIXTURE_API_KEY");
            std::env::remove_var("FIXTURE_RELEASE_STAGE");
            std::env::remove_var("FIXTURE_AUTO_TRACK_SESSIONS");
            std::env::remove_var("FIXTURE_EVENT_MODE");
            std::env::remove_var("FIXTURE_LOGS_DIR");
        }
    }
}

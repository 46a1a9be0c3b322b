//! Typed navigator configuration.
//!
//! A configuration is a JSON document with three sections. Every field has a
//! default, so an empty object is a valid document:
//!
//! ```rust
//! use menupilot::config::NavigatorConfig;
//!
//! let config = NavigatorConfig::from_json_str(r#"{ "vision": { "threshold": 0.9 } }"#).unwrap();
//! assert_eq!(config.vision.threshold, 0.9);
//! assert_eq!(config.navigation.fallback_key, "esc");
//! ```
//!
//! Loading always validates. Out-of-range values are rejected with every
//! violation listed, never discovered at first use.

mod error;
pub mod rules;

pub use error::{ConfigError, ConfigViolation};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, info};

/// Matching and clicking parameters. Times are in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Minimum confidence for a match to count as found
    pub threshold: f64,
    /// How long `wait_for` polls before giving up
    pub timeout: f64,
    /// Sleep between polls
    pub check_interval: f64,
    /// Total tries for find-and-click and for each click
    pub retries: u32,
    pub delay_between_retries: f64,
    /// Pause after a successful click so the UI can react
    pub post_click_delay: f64,
    /// Timeout used by single presence checks
    pub probe_timeout: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            timeout: 5.0,
            check_interval: 0.5,
            retries: 3,
            delay_between_retries: 2.0,
            post_click_delay: 1.0,
            probe_timeout: 1.0,
        }
    }
}

impl VisionConfig {
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout)
    }

    pub fn check_interval(&self) -> Duration {
        seconds(self.check_interval)
    }

    pub fn retry_backoff(&self) -> Duration {
        seconds(self.delay_between_retries)
    }

    pub fn post_click_delay(&self) -> Duration {
        seconds(self.post_click_delay)
    }

    pub fn probe_timeout(&self) -> Duration {
        seconds(self.probe_timeout)
    }
}

/// Loop policy: where to start, where to recover, when to give up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub initial_state: String,
    /// State forced after a stall and used as the default error fallback
    pub recovery_state: String,
    /// Consecutive repeats of one state that trigger a forced recovery
    pub max_stop_count: u32,
    /// Forced recoveries after which the run is aborted
    pub break_count: u32,
    /// Key pressed on every forced recovery
    pub fallback_key: String,
    pub state_transition_delay: f64,
    pub max_iterations: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            initial_state: "undefined_menu".to_string(),
            recovery_state: "undefined_menu".to_string(),
            max_stop_count: 5,
            break_count: 8,
            fallback_key: "esc".to_string(),
            state_transition_delay: 0.1,
            max_iterations: 100,
        }
    }
}

impl NavigationConfig {
    pub fn state_transition_delay(&self) -> Duration {
        seconds(self.state_transition_delay)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the template images
    pub images_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
        }
    }
}

/// Complete configuration document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub vision: VisionConfig,
    pub navigation: NavigationConfig,
    pub paths: PathsConfig,
}

impl NavigatorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.checked()
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    ///
    /// The document goes to a sibling temp file first and is renamed into
    /// place, so readers never observe a half-written file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Check every rule, accumulating all violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        rules::validate(self)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(()) => Ok(self),
            Validation::Failure(errors) => {
                Err(ConfigError::Invalid(errors.iter().cloned().collect()))
            }
        }
    }
}

/// Convert seconds to a `Duration`. Loading rejects values that do not
/// convert; a hand-built config that skips validation collapses them to zero.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_document_uses_defaults() {
        let config = NavigatorConfig::from_json_str("{}").unwrap();

        assert_eq!(config, NavigatorConfig::default());
        assert_eq!(config.vision.threshold, 0.8);
        assert_eq!(config.navigation.max_stop_count, 5);
        assert_eq!(config.navigation.break_count, 8);
        assert_eq!(config.paths.images_dir, PathBuf::from("images"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = NavigatorConfig::from_json_str(
            r#"{ "navigation": { "initial_state": "main_menu", "break_count": 2 } }"#,
        )
        .unwrap();

        assert_eq!(config.navigation.initial_state, "main_menu");
        assert_eq!(config.navigation.break_count, 2);
        assert_eq!(config.navigation.recovery_state, "undefined_menu");
        assert_eq!(config.vision.retries, 3);
    }

    #[test]
    fn invalid_values_are_rejected_at_load() {
        let err = NavigatorConfig::from_json_str(
            r#"{ "vision": { "threshold": 2.0, "check_interval": -1.0 } }"#,
        )
        .unwrap_err();

        match err {
            ConfigError::Invalid(violations) => assert_eq!(violations.len(), 2),
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn oversized_timeout_is_rejected_at_load() {
        let err = NavigatorConfig::from_json_str(r#"{ "vision": { "timeout": 1e30 } }"#)
            .unwrap_err();

        match err {
            ConfigError::Invalid(violations) => assert_eq!(
                violations,
                vec![ConfigViolation::DurationOverflow {
                    field: "vision.timeout",
                    value: 1e30
                }]
            ),
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = NavigatorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn duration_accessors_convert_seconds() {
        let config = VisionConfig::default();

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.check_interval(), Duration::from_millis(500));
        assert_eq!(config.retry_backoff(), Duration::from_secs(2));
        assert_eq!(
            NavigationConfig::default().state_transition_delay(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("navigator.json");
        let mut config = NavigatorConfig::default();
        config.vision.threshold = 0.65;
        config.navigation.fallback_key = "backspace".to_string();

        config.save(&path).unwrap();
        let loaded = NavigatorConfig::from_file(&path).unwrap();

        assert_eq!(loaded, config);
        assert!(!dir.path().join("navigator.json.tmp").exists());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = NavigatorConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

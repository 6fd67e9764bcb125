/// Application configuration loaded from a JSON file
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notify::{SchedulerConfig, HORIZON_DAYS, REMINDER_LEAD_MINUTES};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "TIMETABLE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config value {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Accepted range for `reminder_lead_minutes`: at most a day ahead, never after
/// the class starts.
pub const LEAD_MINUTES_RANGE: std::ops::RangeInclusive<i64> = 1..=1440;

/// Where the app keeps its files and how reminders behave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Timetable data file; the built-in timetable when unset
    pub timetable_path: Option<PathBuf>,
    /// Directory for the preference store
    pub preferences_dir: PathBuf,
    /// Snapshot of armed reminders
    pub alarms_path: PathBuf,
    pub reminder_lead_minutes: i64,
    pub horizon_days: u32,
    /// Longest the dispatcher sleeps between checks
    pub poll_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timetable_path: None,
            preferences_dir: PathBuf::from(".timetable"),
            alarms_path: PathBuf::from(".timetable/alarms.json"),
            reminder_lead_minutes: REMINDER_LEAD_MINUTES,
            horizon_days: HORIZON_DAYS,
            poll_interval_secs: 30,
        }
    }
}

impl AppConfig {
    /// Loads the config at `path`.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Parsed config, or the defaults when the file does not exist
    /// * `Err` - If the file can't be read or parsed, or a value is out of range
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Loads from `explicit` if given, else from the file named by
    /// `TIMETABLE_CONFIG`, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => match env::var_os(CONFIG_ENV_VAR) {
                Some(path) => Self::load_from_file(Path::new(&path)),
                None => Ok(Self::default()),
            },
        }
    }

    /// Checks values that would otherwise misbehave later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LEAD_MINUTES_RANGE.contains(&self.reminder_lead_minutes) {
            return Err(ConfigError::Invalid {
                field: "reminder_lead_minutes".to_string(),
                message: format!(
                    "{} is outside {}..={}",
                    self.reminder_lead_minutes,
                    LEAD_MINUTES_RANGE.start(),
                    LEAD_MINUTES_RANGE.end()
                ),
            });
        }
        Ok(())
    }

    /// Scheduler settings. A lead outside the accepted range falls back to
    /// the default so a config built in code cannot panic here.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        let lead = Some(self.reminder_lead_minutes)
            .filter(|minutes| LEAD_MINUTES_RANGE.contains(minutes))
            .and_then(Duration::try_minutes);
        let lead = match lead {
            Some(lead) => lead,
            None => {
                warn!(
                    reminder_lead_minutes = self.reminder_lead_minutes,
                    "Reminder lead out of range, using the default"
                );
                SchedulerConfig::default().lead
            }
        };
        SchedulerConfig {
            lead,
            horizon_days: self.horizon_days,
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.scheduler_config().lead, Duration::minutes(15));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"reminder_lead_minutes": 10, "timetable_path": "tt.json"}"#)
            .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.reminder_lead_minutes, 10);
        assert_eq!(config.timetable_path, Some(PathBuf::from("tt.json")));
        assert_eq!(config.horizon_days, HORIZON_DAYS);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_negative_lead_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"reminder_lead_minutes": -10}"#).unwrap();
        match AppConfig::load_from_file(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "reminder_lead_minutes"),
            other => panic!("expected invalid lead, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_lead_is_rejected_without_panicking() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"reminder_lead_minutes": 9223372036854775807}"#).unwrap();
        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::Invalid { .. })
        ));

        let config = AppConfig {
            reminder_lead_minutes: i64::MAX,
            ..AppConfig::default()
        };
        assert_eq!(config.scheduler_config().lead, Duration::minutes(15));
    }

    #[test]
    fn test_lead_bounds_are_inclusive() {
        for minutes in [1, 1440] {
            let config = AppConfig {
                reminder_lead_minutes: minutes,
                ..AppConfig::default()
            };
            assert!(config.validate().is_ok());
            assert_eq!(config.scheduler_config().lead, Duration::minutes(minutes));
        }
    }
}

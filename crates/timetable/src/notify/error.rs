//! Error types for reminder registration and delivery.

use thiserror::Error;

/// Errors returned by an alarm registry when arming a trigger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlarmError {
    /// The platform refuses exact alarms (missing capability or permission)
    #[error("Exact alarms are not permitted")]
    ExactAlarmDenied,

    /// The registry cannot take new triggers right now
    #[error("Alarm registry unavailable: {message}")]
    Unavailable { message: String },

    /// Reading or writing the persisted triggers failed
    #[error("Alarm storage error: {message}")]
    Storage { message: String },
}

impl AlarmError {
    /// Returns true if the trigger should be retried with best-effort timing.
    pub fn should_fallback(&self) -> bool {
        matches!(self, AlarmError::ExactAlarmDenied)
    }
}

impl From<std::io::Error> for AlarmError {
    fn from(err: std::io::Error) -> Self {
        AlarmError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AlarmError {
    fn from(err: serde_json::Error) -> Self {
        AlarmError::Storage {
            message: err.to_string(),
        }
    }
}

/// Errors returned by a notification sink when showing an alert.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The user has not granted permission to post notifications
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The alert could not be shown
    #[error("Notification delivery failed: {message}")]
    Delivery { message: String },
}

impl NotifyError {
    /// Returns true if the alert should be dropped without further noise.
    pub fn is_silent_drop(&self) -> bool {
        matches!(self, NotifyError::PermissionDenied)
    }
}

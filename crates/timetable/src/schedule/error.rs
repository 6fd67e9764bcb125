//! Error types for loading timetable data.

use thiserror::Error;

/// Errors that can occur while loading the timetable book.
///
/// Lookups themselves never fail; these only surface at startup when the
/// data file is read.
#[derive(Debug, Error, Clone)]
pub enum ScheduleError {
    /// The data file could not be read
    #[error("Failed to read timetable data from {path}: {message}")]
    Io { path: String, message: String },

    /// The data file is not valid JSON or does not match the expected layout
    #[error("Invalid timetable data: {message}")]
    InvalidData { message: String },

    /// A class entry carries a type label we do not recognise
    #[error("Unknown class type: {label}")]
    UnknownClassType { label: String },
}

impl ScheduleError {
    /// Returns true if the error comes from the content of the data rather
    /// than from reaching the file.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidData { .. } | ScheduleError::UnknownClassType { .. }
        )
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::InvalidData {
            message: err.to_string(),
        }
    }
}

//! Where the "Notes" button leads.

use crate::schedule::ScheduleKey;

/// Study notes published for Engineering / Year 2 / A8.
pub const NOTES_URL: &str =
    "https://www.notion.so/Study-Notes-Class-A8-24b05735a36e809e95dfe9f6119ba6fd?source=copy_link";

const NOTES_DEPARTMENT: &str = "School of Engineering";
const NOTES_YEAR: &str = "Year 2";
const NOTES_CLASS: &str = "A8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesTarget {
    /// Open this URL in a browser
    External(String),
    /// Show an in-app message instead
    Placeholder { title: String, message: String },
}

/// Only A8 of Engineering Year 2 has notes; everyone else gets a placeholder.
pub fn notes_target(key: &ScheduleKey) -> NotesTarget {
    if key.department == NOTES_DEPARTMENT && key.year == NOTES_YEAR && key.class_name == NOTES_CLASS
    {
        NotesTarget::External(NOTES_URL.to_string())
    } else {
        NotesTarget::Placeholder {
            title: "Notes are in progress".to_string(),
            message: format!(
                "For demo, open Class {} ({}, {}) to see live notes.",
                NOTES_CLASS, NOTES_YEAR, NOTES_DEPARTMENT
            ),
        }
    }
}

//! User-facing reminder alerts and the sinks that show them.

use super::error::NotifyError;
use super::registry::ReminderPayload;
use chrono::Duration;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// A rendered class reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    /// One-line summary: time, room and instructor
    pub summary: String,
    pub body: String,
}

fn or_unknown(value: &str, fallback: &'static str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

impl Alert {
    pub fn from_payload(payload: &ReminderPayload, lead: Duration) -> Self {
        let subject = or_unknown(&payload.subject, "Unknown Subject");
        let time = or_unknown(&payload.time_range, "Unknown Time");
        let room = or_unknown(&payload.room, "Unknown Room");
        let instructor = or_unknown(&payload.instructor, "Unknown Faculty");
        let department = or_unknown(&payload.department, "Unknown Department");
        let year = or_unknown(&payload.year, "Unknown Year");
        let class_name = or_unknown(&payload.class_name, "Unknown Class");

        Self {
            title: format!("Class Reminder: {}", subject),
            summary: format!("{} • {} • {}", time, room, instructor),
            body: format!(
                "Your {} class is starting in {} minutes!\n\nTime: {}\nRoom: {}\nFaculty: {}\n\n{} - {} - {}",
                subject,
                lead.num_minutes(),
                time,
                room,
                instructor,
                department,
                year,
                class_name
            ),
        }
    }
}

/// Something that can put an alert in front of the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Writes alerts to the log.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        info!(title = %alert.title, summary = %alert.summary, "{}", alert.body);
        Ok(())
    }
}

/// Keeps delivered alerts in memory; permission can be revoked to observe
/// dropped deliveries.
#[derive(Debug)]
pub struct MemorySink {
    delivered: Mutex<Vec<Alert>>,
    permitted: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            permitted: AtomicBool::new(true),
        }
    }

    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> Vec<Alert> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        if !self.permitted.load(Ordering::Relaxed) {
            return Err(NotifyError::PermissionDenied);
        }
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_text() {
        let payload = ReminderPayload {
            subject: "Mathematics".to_string(),
            time_range: "14:30 - 15:30".to_string(),
            room: "Room 303".to_string(),
            instructor: "Dr.E.Ramesh Kumar".to_string(),
            department: "School of Engineering".to_string(),
            year: "Year 2".to_string(),
            class_name: "A8".to_string(),
        };
        let alert = Alert::from_payload(&payload, Duration::minutes(15));
        assert_eq!(alert.title, "Class Reminder: Mathematics");
        assert_eq!(alert.summary, "14:30 - 15:30 • Room 303 • Dr.E.Ramesh Kumar");
        assert!(alert.body.starts_with("Your Mathematics class is starting in 15 minutes!"));
        assert!(alert.body.ends_with("School of Engineering - Year 2 - A8"));
    }

    #[test]
    fn test_alert_fills_missing_fields() {
        let payload = ReminderPayload {
            subject: String::new(),
            time_range: "9:00 - 10:00".to_string(),
            room: " ".to_string(),
            instructor: String::new(),
            department: String::new(),
            year: String::new(),
            class_name: String::new(),
        };
        let alert = Alert::from_payload(&payload, Duration::minutes(15));
        assert_eq!(alert.title, "Class Reminder: Unknown Subject");
        assert_eq!(alert.summary, "9:00 - 10:00 • Unknown Room • Unknown Faculty");
    }

    #[test]
    fn test_memory_sink_refuses_without_permission() {
        let sink = MemorySink::new();
        sink.set_permitted(false);
        let alert = Alert {
            title: "t".into(),
            summary: "s".into(),
            body: "b".into(),
        };
        assert_eq!(sink.notify(&alert), Err(NotifyError::PermissionDenied));
        assert!(sink.delivered().is_empty());
    }
}

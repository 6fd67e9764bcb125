//! Class timetable lookup and class reminders.
//!
//! A selection of (department, year, class) resolves to a weekday table of
//! classes. Each class is labelled upcoming, current or completed against the
//! wall clock, and a reminder is armed 15 minutes before every class in the
//! coming week.

pub mod app;
pub mod clock;
pub mod config;
pub mod logging;
pub mod notify;
pub mod prefs;
pub mod schedule;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use schedule::{ScheduleBook, ScheduleKey};
pub use types::{AppState, StateError};

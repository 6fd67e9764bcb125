//! Classification of class entries relative to the current time.

use chrono::{Duration, NaiveTime};
use serde::Serialize;
use std::fmt;

use super::types::{ClassEntry, DaySchedule};

/// Where a class sits relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassStatus {
    Upcoming,
    Current,
    Completed,
    /// The entry's time range could not be parsed
    Unknown,
}

impl ClassStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ClassStatus::Upcoming => "UPCOMING",
            ClassStatus::Current => "CURRENT",
            ClassStatus::Completed => "COMPLETED",
            ClassStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies `now` against an already parsed range.
///
/// The start is inclusive and the end exclusive.
pub fn classify_times(now: NaiveTime, start: NaiveTime, end: NaiveTime) -> ClassStatus {
    if now < start {
        ClassStatus::Upcoming
    } else if now < end {
        ClassStatus::Current
    } else {
        ClassStatus::Completed
    }
}

/// Classifies a single entry, returning `Unknown` if its range is malformed.
pub fn classify(now: NaiveTime, entry: &ClassEntry) -> ClassStatus {
    match entry.times() {
        Some((start, end)) => classify_times(now, start, end),
        None => ClassStatus::Unknown,
    }
}

/// Labels every entry of a day, keeping table order.
pub fn classify_day(now: NaiveTime, day: &DaySchedule) -> Vec<(&ClassEntry, ClassStatus)> {
    day.iter().map(|entry| (entry, classify(now, entry))).collect()
}

/// The first entry in table order whose start is strictly after `now`.
///
/// Tables are not guaranteed to be sorted, so this is a plain scan.
pub fn next_class(now: NaiveTime, day: &DaySchedule) -> Option<&ClassEntry> {
    day.iter()
        .find(|entry| entry.start().is_some_and(|start| now < start))
}

/// Time remaining until a class starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown(Duration);

impl Countdown {
    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn is_started(&self) -> bool {
        self.0 <= Duration::zero()
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0.num_hours();
        let minutes = self.0.num_minutes() % 60;
        if hours > 0 {
            write!(f, "{}h {}m", hours, minutes)
        } else if minutes > 0 {
            write!(f, "{}m", minutes)
        } else if self.is_started() {
            f.write_str("Starting now")
        } else {
            // Less than a minute away.
            write!(f, "{}m", minutes)
        }
    }
}

/// Duration from `now` to the entry's start, or `None` if it does not parse.
pub fn time_until(now: NaiveTime, entry: &ClassEntry) -> Option<Countdown> {
    entry.start().map(|start| Countdown(start - now))
}

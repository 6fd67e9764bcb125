//! Weekday timetables: data loading, lookup, time parsing and status labels.
mod config;
mod error;
mod status;
mod time_range;
mod types;

pub use config::{ScheduleBook, TableConfig, TableDay, TimetableFile};
pub use error::ScheduleError;
pub use status::{
    classify, classify_day, classify_times, next_class, time_until, ClassStatus, Countdown,
};
pub use time_range::{parse_clock, parse_time_range};
pub use types::{ClassEntry, ClassType, DaySchedule, ScheduleKey};

use chrono::NaiveDateTime;

/// Today's view of a class group: the entries with their status and the
/// next class to attend.
#[derive(Debug, Clone)]
pub struct TodayView {
    pub key: ScheduleKey,
    pub day: DaySchedule,
    pub statuses: Vec<ClassStatus>,
    pub next: Option<(ClassEntry, Option<Countdown>)>,
}

/// Resolves and labels today's schedule for `key` at `now`.
pub fn today_view(book: &ScheduleBook, key: &ScheduleKey, now: NaiveDateTime) -> TodayView {
    let day = book.for_date(key, now.date());
    let time = now.time();

    let statuses = day
        .iter()
        .map(|entry| classify(time, entry))
        .collect();
    let next = if day.is_no_classes() {
        None
    } else {
        next_class(time, &day).map(|entry| (entry.clone(), time_until(time, entry)))
    };

    TodayView {
        key: key.clone(),
        day,
        statuses,
        next,
    }
}

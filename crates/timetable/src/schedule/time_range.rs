//! Parsing of "H[H]:MM - H[H]:MM" class time ranges.

use chrono::{Duration, NaiveTime, Timelike};

/// Parses a single wall-clock time such as `"9:00"` or `" 14:30"`.
///
/// Only the first two characters after the colon are read as minutes, so
/// trailing text like `"10:00am"` still parses.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let mut parts = raw.trim().split(':');
    let hour_part = parts.next()?;
    let minute_part = parts.next()?;

    let hour = hour_part.trim().parse::<u32>().ok()?;
    let minute = minute_part
        .trim()
        .chars()
        .take(2)
        .collect::<String>()
        .parse::<u32>()
        .ok()?;

    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parses a class time range into `(start, end)`.
///
/// Tables sometimes write afternoon end times in 12-hour form without a
/// marker ("12:20 - 01:20"). When the end is earlier than the start and the
/// start is at or after noon, the end is moved forward by twelve hours.
/// Ranges that really cross midnight are not supported.
///
/// Returns `None` if either side fails to parse.
pub fn parse_time_range(range: &str) -> Option<(NaiveTime, NaiveTime)> {
    let mut sections = range.split('-');
    let start = parse_clock(sections.next()?)?;
    let end = parse_clock(sections.next()?)?;

    let end = if end < start && start.hour() >= 12 {
        end + Duration::hours(12)
    } else {
        end
    };

    Some((start, end))
}

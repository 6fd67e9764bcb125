//! End-to-end runs over the built-in timetable with a fixed clock.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use timetable::clock::{Clock, FixedClock};
use timetable::notify::{
    AlarmRegistry, Dispatcher, MemoryAlarmRegistry, MemorySink, ReminderScheduler, SlotId,
};
use timetable::schedule::{today_view, ClassStatus, ScheduleBook, ScheduleKey};

fn a8() -> ScheduleKey {
    ScheduleKey::new("School of Engineering", "Year 2", "A8")
}

/// Monday 19 October 2026.
fn monday_at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn setup() -> (Arc<ScheduleBook>, Arc<MemoryAlarmRegistry>, ReminderScheduler) {
    let book = Arc::new(ScheduleBook::builtin().unwrap());
    let registry = Arc::new(MemoryAlarmRegistry::new());
    let scheduler = ReminderScheduler::new(book.clone(), registry.clone());
    (book, registry, scheduler)
}

#[test]
fn saturday_repeats_monday() {
    let book = ScheduleBook::builtin().unwrap();
    let key = a8();
    assert_eq!(
        book.day_schedule(&key, Weekday::Sat),
        book.day_schedule(&key, Weekday::Mon)
    );
    assert!(book.day_schedule(&key, Weekday::Sun).is_no_classes());
}

#[test]
fn unknown_selection_gets_default_timetable() {
    let book = ScheduleBook::builtin().unwrap();
    let key = ScheduleKey::new("School of Law", "Year 4", "A10");
    assert_eq!(book.day_schedule(&key, Weekday::Wed), book.default_schedule());
}

#[test]
fn today_view_tracks_the_clock() {
    let book = ScheduleBook::builtin().unwrap();
    let view = today_view(&book, &a8(), monday_at(10, 30));

    assert_eq!(view.statuses[0], ClassStatus::Completed);
    assert_eq!(view.statuses[1], ClassStatus::Current);
    assert_eq!(view.statuses[2], ClassStatus::Upcoming);

    let (next, countdown) = view.next.unwrap();
    assert_eq!(next.time_range, "11:20 - 12:20");
    assert_eq!(countdown.unwrap().to_string(), "50m");
}

#[test]
fn week_of_reminders_for_a8() {
    let (_, registry, scheduler) = setup();
    let report = scheduler.schedule(&a8(), monday_at(8, 0));

    // Five weekdays plus the Saturday repeat of Monday, six classes each.
    assert_eq!(report.armed, 36);
    assert_eq!(report.skipped_past, 0);
    assert_eq!(registry.len(), 36);

    let first = registry.get(SlotId::new(0, 0)).unwrap();
    assert_eq!(first.fire_at, monday_at(8, 45));
    // Sunday has nothing armed.
    assert!(registry.get(SlotId::new(6, 0)).is_none());
    assert!(registry.get(SlotId::new(5, 5)).is_some());
}

#[test]
fn rescheduling_is_idempotent() {
    let (_, registry, scheduler) = setup();
    scheduler.schedule(&a8(), monday_at(8, 0));
    let before = registry.pending();
    scheduler.schedule(&a8(), monday_at(8, 0));
    assert_eq!(registry.pending(), before);
}

#[test]
fn reminders_arrive_fifteen_minutes_early() {
    let (_, registry, scheduler) = setup();
    let clock = FixedClock::new(monday_at(8, 0));
    scheduler.schedule(&a8(), clock.now());

    let sink = Arc::new(MemorySink::new());
    let dispatcher = Dispatcher::new(registry.clone(), sink.clone(), Duration::minutes(15));

    clock.set(monday_at(8, 44));
    assert_eq!(dispatcher.fire_due(clock.now()).delivered, 0);

    clock.advance(Duration::minutes(1));
    assert_eq!(dispatcher.fire_due(clock.now()).delivered, 1);

    let delivered = sink.delivered();
    assert!(delivered[0]
        .body
        .starts_with("Your Lateral Thinking class is starting in 15 minutes!"));
    assert!(delivered[0].body.ends_with("School of Engineering - Year 2 - A8"));
    assert_eq!(registry.len(), 35);
}

//! Arms class reminders for the coming week.
//!
//! Every run wipes the whole slot space and rebuilds it, so running twice
//! with the same selection and clock leaves the same triggers armed.

use super::registry::{AlarmRegistry, ReminderPayload, SlotId};
use crate::schedule::{ScheduleBook, ScheduleKey};
use chrono::{Datelike, Days, Duration, NaiveDateTime};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Minutes before class start that a reminder fires.
pub const REMINDER_LEAD_MINUTES: i64 = 15;

/// Number of calendar days (starting today) that get reminders.
pub const HORIZON_DAYS: u32 = 7;

/// Reminder slots per day; entries past this index are not armed.
pub const SLOTS_PER_DAY: u32 = 10;

/// Tunables for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How long before class start a reminder fires
    pub lead: Duration,
    /// Days to cover, capped at [`HORIZON_DAYS`]
    pub horizon_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lead: Duration::minutes(REMINDER_LEAD_MINUTES),
            horizon_days: HORIZON_DAYS,
        }
    }
}

/// Outcome of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    /// Triggers registered, exact or not
    pub armed: usize,
    /// Of `armed`, how many fell back to best-effort timing
    pub inexact: usize,
    /// Class start or reminder time not in the future
    pub skipped_past: usize,
    /// Time range did not parse
    pub skipped_unparsable: usize,
    /// Entry index beyond the per-day slot space
    pub skipped_overflow: usize,
    /// Registry refused the trigger outright
    pub failed: usize,
}

/// Walks the next days of a selection's timetable and arms one reminder per
/// future class.
pub struct ReminderScheduler {
    book: Arc<ScheduleBook>,
    registry: Arc<dyn AlarmRegistry>,
    config: SchedulerConfig,
    /// Only one cancel-then-register sequence may run at a time
    run_lock: Mutex<()>,
}

impl ReminderScheduler {
    pub fn new(book: Arc<ScheduleBook>, registry: Arc<dyn AlarmRegistry>) -> Self {
        Self::with_config(book, registry, SchedulerConfig::default())
    }

    pub fn with_config(
        book: Arc<ScheduleBook>,
        registry: Arc<dyn AlarmRegistry>,
        mut config: SchedulerConfig,
    ) -> Self {
        if config.horizon_days > HORIZON_DAYS {
            warn!(
                requested = config.horizon_days,
                max = HORIZON_DAYS,
                "Reminder horizon capped to the slot space"
            );
            config.horizon_days = HORIZON_DAYS;
        }
        Self {
            book,
            registry,
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Cancels every slot and re-arms reminders for `selection` as of `now`.
    pub fn schedule(&self, selection: &ScheduleKey, now: NaiveDateTime) -> ScheduleReport {
        let _guard = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut report = ScheduleReport::default();

        self.cancel_all_slots();

        let today = now.date();
        for day_offset in 0..self.config.horizon_days {
            let Some(date) = today.checked_add_days(Days::new(u64::from(day_offset))) else {
                break;
            };
            let day = self.book.for_date(selection, date);
            if day.is_no_classes() {
                debug!(day_offset, weekday = ?date.weekday(), "No classes, nothing to arm");
                continue;
            }

            for (index, entry) in day.iter().enumerate() {
                let index = index as u32;
                if index >= SLOTS_PER_DAY {
                    warn!(
                        day_offset,
                        index,
                        subject = %entry.subject,
                        "More classes than reminder slots, skipping"
                    );
                    report.skipped_overflow += 1;
                    continue;
                }

                let Some((start, _)) = entry.times() else {
                    debug!(
                        day_offset,
                        index,
                        time_range = %entry.time_range,
                        "Unparsable time range, skipping"
                    );
                    report.skipped_unparsable += 1;
                    continue;
                };

                let class_start = date.and_time(start);
                if class_start <= now {
                    report.skipped_past += 1;
                    continue;
                }

                // Classes starting within the lead time get no reminder.
                let fire_at = class_start - self.config.lead;
                if fire_at <= now {
                    report.skipped_past += 1;
                    continue;
                }

                let slot = SlotId::new(day_offset, index);
                let payload = ReminderPayload::new(entry, selection);
                self.arm(slot, fire_at, payload, &mut report);
            }
        }

        info!(
            selection = %selection,
            armed = report.armed,
            inexact = report.inexact,
            skipped_past = report.skipped_past,
            skipped_unparsable = report.skipped_unparsable,
            failed = report.failed,
            "Class reminders scheduled"
        );
        report
    }

    /// Cancels every reminder this scheduler could have armed.
    pub fn clear_all(&self) {
        let _guard = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.cancel_all_slots();
        info!("Cleared all class reminders");
    }

    /// Enumerates the full slot space; the registry cannot cancel by prefix.
    fn cancel_all_slots(&self) {
        for day_offset in 0..HORIZON_DAYS {
            for index in 0..SLOTS_PER_DAY {
                self.registry.cancel(SlotId::new(day_offset, index));
            }
        }
    }

    fn arm(
        &self,
        slot: SlotId,
        fire_at: NaiveDateTime,
        payload: ReminderPayload,
        report: &mut ScheduleReport,
    ) {
        match self.registry.schedule_exact(slot, fire_at, payload.clone()) {
            Ok(()) => {
                debug!(slot_id = %slot, fire_at = %fire_at, subject = %payload.subject, "Armed exact reminder");
                report.armed += 1;
            }
            Err(e) if e.should_fallback() => {
                match self.registry.schedule_inexact(slot, fire_at, payload) {
                    Ok(()) => {
                        debug!(slot_id = %slot, fire_at = %fire_at, "Armed best-effort reminder");
                        report.armed += 1;
                        report.inexact += 1;
                    }
                    Err(e) => {
                        warn!(slot_id = %slot, error = %e, "Failed to arm reminder");
                        report.failed += 1;
                    }
                }
            }
            Err(e) => {
                warn!(slot_id = %slot, error = %e, "Failed to arm reminder");
                report.failed += 1;
            }
        }
    }
}

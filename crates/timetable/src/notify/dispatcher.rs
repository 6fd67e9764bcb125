//! Fires due reminders from the in-process registry.
//!
//! This stands in for the platform alarm service: it sleeps until the next
//! trigger is due, renders it and hands it to a notification sink.

use super::alert::{Alert, NotificationSink};
use super::registry::MemoryAlarmRegistry;
use crate::clock::Clock;
use chrono::{Duration, NaiveDateTime};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Counts from one pass over due triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    /// Dropped because notifications are not permitted
    pub dropped: usize,
    pub failed: usize,
}

pub struct Dispatcher {
    registry: Arc<MemoryAlarmRegistry>,
    sink: Arc<dyn NotificationSink>,
    lead: Duration,
    /// Upper bound on a single sleep, so newly armed triggers are noticed
    poll_interval: std::time::Duration,
    /// Where to persist the registry after triggers fire
    snapshot_path: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<MemoryAlarmRegistry>,
        sink: Arc<dyn NotificationSink>,
        lead: Duration,
    ) -> Self {
        Self {
            registry,
            sink,
            lead,
            poll_interval: std::time::Duration::from_secs(30),
            snapshot_path: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: std::time::Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_snapshot_path(mut self, path: PathBuf) -> Self {
        self.snapshot_path = Some(path);
        self
    }

    /// Fires every trigger due at `now`. Each one is independent: a refused
    /// delivery is not retried and does not stop the others.
    pub fn fire_due(&self, now: NaiveDateTime) -> DispatchReport {
        let mut report = DispatchReport::default();
        let due = self.registry.take_due(now);
        if due.is_empty() {
            return report;
        }

        for pending in &due {
            let alert = Alert::from_payload(&pending.payload, self.lead);
            match self.sink.notify(&alert) {
                Ok(()) => {
                    info!(
                        slot_id = %pending.slot_id,
                        fire_at = %pending.fire_at,
                        subject = %pending.payload.subject,
                        "Delivered class reminder"
                    );
                    report.delivered += 1;
                }
                Err(e) if e.is_silent_drop() => {
                    debug!(slot_id = %pending.slot_id, "Notifications not permitted, dropping reminder");
                    report.dropped += 1;
                }
                Err(e) => {
                    warn!(slot_id = %pending.slot_id, error = %e, "Failed to deliver class reminder");
                    report.failed += 1;
                }
            }
        }

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = self.registry.save_to(path) {
                warn!(path = %path.display(), error = %e, "Failed to persist reminders after firing");
            }
        }

        report
    }

    /// How long to sleep before the next pass.
    fn next_wait(&self, now: NaiveDateTime) -> std::time::Duration {
        match self.registry.next_fire_at() {
            Some(at) => (at - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO)
                .min(self.poll_interval),
            None => self.poll_interval,
        }
    }

    /// Fires reminders as they fall due until `shutdown` flips to true or its
    /// sender is dropped.
    pub async fn run(&self, clock: Arc<dyn Clock>, mut shutdown: watch::Receiver<bool>) {
        info!(pending = self.registry.len(), "Reminder dispatcher started");

        loop {
            let now = clock.now();
            self.fire_due(now);

            if *shutdown.borrow() {
                break;
            }

            let wait = self.next_wait(now);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(pending = self.registry.len(), "Reminder dispatcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::notify::alert::MemorySink;
    use crate::notify::registry::{AlarmRegistry, ReminderPayload, SlotId};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn payload(subject: &str) -> ReminderPayload {
        ReminderPayload {
            subject: subject.to_string(),
            time_range: "10:00 - 11:00".to_string(),
            room: "Room 709".to_string(),
            instructor: "Mr.J.Manivanan".to_string(),
            department: "School of Engineering".to_string(),
            year: "Year 2".to_string(),
            class_name: "A8".to_string(),
        }
    }

    fn setup() -> (Arc<MemoryAlarmRegistry>, Arc<MemorySink>, Dispatcher) {
        let registry = Arc::new(MemoryAlarmRegistry::new());
        let sink = Arc::new(MemorySink::new());
        let dispatcher = Dispatcher::new(registry.clone(), sink.clone(), Duration::minutes(15));
        (registry, sink, dispatcher)
    }

    #[test]
    fn test_fire_due_only_delivers_due() {
        let (registry, sink, dispatcher) = setup();
        registry
            .schedule_exact(SlotId::new(0, 0), at(9, 45), payload("R Programming"))
            .unwrap();
        registry
            .schedule_exact(SlotId::new(0, 1), at(11, 5), payload("AIML"))
            .unwrap();

        let report = dispatcher.fire_due(at(10, 0));
        assert_eq!(report.delivered, 1);
        assert_eq!(sink.delivered()[0].title, "Class Reminder: R Programming");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_denied_permission_drops_without_retry() {
        let (registry, sink, dispatcher) = setup();
        sink.set_permitted(false);
        registry
            .schedule_exact(SlotId::new(0, 0), at(9, 45), payload("OOP"))
            .unwrap();

        let report = dispatcher.fire_due(at(10, 0));
        assert_eq!(report.dropped, 1);
        assert!(registry.is_empty());

        sink.set_permitted(true);
        assert_eq!(dispatcher.fire_due(at(10, 1)).delivered, 0);
    }

    #[test]
    fn test_next_wait_is_capped_by_poll_interval() {
        let (registry, _sink, dispatcher) = setup();
        let dispatcher = dispatcher.with_poll_interval(std::time::Duration::from_secs(30));
        assert_eq!(dispatcher.next_wait(at(9, 0)), std::time::Duration::from_secs(30));

        registry
            .schedule_exact(SlotId::new(0, 0), at(9, 0) + Duration::seconds(10), payload("X"))
            .unwrap();
        assert_eq!(dispatcher.next_wait(at(9, 0)), std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_run_fires_then_stops_on_shutdown() {
        let (registry, sink, dispatcher) = setup();
        registry
            .schedule_exact(SlotId::new(0, 0), at(9, 45), payload("Mathematics"))
            .unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at(9, 45)));

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        dispatcher.run(clock, rx).await;

        assert_eq!(sink.delivered().len(), 1);
        assert!(registry.is_empty());
    }
}

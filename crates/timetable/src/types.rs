use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::app::{initial_screen, Effect, Screen};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::notify::{
    AlarmError, AlarmRegistry, Dispatcher, MemoryAlarmRegistry, NotificationSink,
    ReminderScheduler, ScheduleReport, TracingSink,
};
use crate::prefs::{
    clear_selection, load_selection, save_selection, JsonFilePreferences, PreferenceStore,
    PrefsError, UserSelection, PREFERENCES_NAME,
};
use crate::schedule::{ScheduleBook, ScheduleError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Prefs(#[from] PrefsError),

    #[error(transparent)]
    Alarm(#[from] AlarmError),
}

/// Everything the host needs, shared behind `Arc`s.
pub struct AppState {
    pub config: AppConfig,
    pub book: Arc<ScheduleBook>,
    pub prefs: Arc<dyn PreferenceStore>,
    pub registry: Arc<MemoryAlarmRegistry>,
    pub scheduler: ReminderScheduler,
    pub sink: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
    /// Day the current reminders were armed on
    armed_on: Mutex<Option<NaiveDate>>,
}

impl AppState {
    /// Wires up the file-backed stores, the log sink and the system clock.
    pub fn from_config(config: AppConfig) -> Result<Self, StateError> {
        let book = match &config.timetable_path {
            Some(path) => ScheduleBook::load_from_path(path)?,
            None => ScheduleBook::builtin()?,
        };
        let prefs = JsonFilePreferences::open(&config.preferences_dir, PREFERENCES_NAME)?;
        let registry = MemoryAlarmRegistry::load_from(&config.alarms_path)?;

        info!(
            tables = book.table_count(),
            armed = registry.len(),
            "Application state ready"
        );

        Ok(Self::with_parts(
            config,
            Arc::new(book),
            Arc::new(prefs),
            Arc::new(registry),
            Arc::new(TracingSink),
            Arc::new(SystemClock),
        ))
    }

    /// Assembles state from explicit parts.
    pub fn with_parts(
        config: AppConfig,
        book: Arc<ScheduleBook>,
        prefs: Arc<dyn PreferenceStore>,
        registry: Arc<MemoryAlarmRegistry>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let alarm_registry: Arc<dyn AlarmRegistry> = registry.clone();
        let scheduler =
            ReminderScheduler::with_config(book.clone(), alarm_registry, config.scheduler_config());
        Self {
            config,
            book,
            prefs,
            registry,
            scheduler,
            sink,
            clock,
            armed_on: Mutex::new(None),
        }
    }

    pub fn selection(&self) -> Option<UserSelection> {
        load_selection(self.prefs.as_ref())
    }

    pub fn start_screen(&self) -> Screen {
        initial_screen(self.selection())
    }

    /// Carries out navigation effects in order. Returns the report of the
    /// last scheduling run, if any.
    pub fn apply(&self, effects: &[Effect]) -> Result<Option<ScheduleReport>, StateError> {
        let mut report = None;
        let mut alarms_changed = false;

        for effect in effects {
            match effect {
                Effect::SaveSelection(selection) => save_selection(self.prefs.as_ref(), selection)?,
                Effect::ClearSelection => clear_selection(self.prefs.as_ref())?,
                Effect::ScheduleReminders(key) => {
                    let now = self.clock.now();
                    report = Some(self.scheduler.schedule(key, now));
                    *self.armed_on.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(now.date());
                    alarms_changed = true;
                }
                Effect::ClearReminders => {
                    self.scheduler.clear_all();
                    *self.armed_on.lock().unwrap_or_else(PoisonError::into_inner) = None;
                    alarms_changed = true;
                }
            }
        }

        if alarms_changed {
            self.persist_alarms()?;
        }
        Ok(report)
    }

    /// Re-arms reminders for the saved selection, as done on every launch.
    pub fn refresh_reminders(&self) -> Result<Option<ScheduleReport>, StateError> {
        match self.selection() {
            Some(selection) => self.apply(&[Effect::ScheduleReminders(selection)]),
            None => {
                warn!("No saved selection, nothing to schedule");
                Ok(None)
            }
        }
    }

    /// Re-arms once the calendar day has moved on since the last run, so the
    /// seven-day window keeps rolling in a long-lived process. Does nothing
    /// without a saved selection.
    pub fn refresh_if_stale(&self) -> Result<Option<ScheduleReport>, StateError> {
        let Some(selection) = self.selection() else {
            return Ok(None);
        };
        let today = self.clock.now().date();
        let armed_on = *self.armed_on.lock().unwrap_or_else(PoisonError::into_inner);
        if armed_on == Some(today) {
            return Ok(None);
        }
        info!(armed_on = ?armed_on, today = %today, "Day changed, re-arming reminders");
        self.apply(&[Effect::ScheduleReminders(selection)])
    }

    pub fn persist_alarms(&self) -> Result<(), StateError> {
        self.registry.save_to(&self.config.alarms_path)?;
        Ok(())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.registry.clone(),
            self.sink.clone(),
            self.scheduler.config().lead,
        )
        .with_poll_interval(self.config.poll_interval())
        .with_snapshot_path(self.config.alarms_path.clone())
    }
}

//! Deferred-trigger registry that reminders are armed against.

use super::error::AlarmError;
use crate::schedule::{ClassEntry, ScheduleKey};
use chrono::NaiveDateTime;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Base value of every slot id.
pub const SLOT_BASE: u32 = 2000;

/// Stable id of one reminder slot, derived from (day offset, index in day).
///
/// Re-registering the same slot replaces the previous trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(u32);

impl SlotId {
    pub fn new(day_offset: u32, index: u32) -> Self {
        Self(SLOT_BASE + day_offset * 100 + index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Day offset this slot belongs to, or `None` for an id below the
    /// slot base (possible in a hand-edited snapshot).
    pub fn day_offset(&self) -> Option<u32> {
        self.0.checked_sub(SLOT_BASE).map(|rel| rel / 100)
    }

    pub fn index(&self) -> Option<u32> {
        self.0.checked_sub(SLOT_BASE).map(|rel| rel % 100)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to render a reminder, carried by the trigger itself so
/// firing does not depend on any in-memory state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub subject: String,
    pub time_range: String,
    pub room: String,
    pub instructor: String,
    pub department: String,
    pub year: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

impl ReminderPayload {
    pub fn new(entry: &ClassEntry, key: &ScheduleKey) -> Self {
        Self {
            subject: entry.subject.clone(),
            time_range: entry.time_range.clone(),
            room: entry.room.clone(),
            instructor: entry.instructor.clone(),
            department: key.department.clone(),
            year: key.year.clone(),
            class_name: key.class_name.clone(),
        }
    }
}

/// How precisely the platform promised to honour the fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmPrecision {
    Exact,
    /// Best effort; the platform may defer it for power management
    Inexact,
}

/// A trigger waiting to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub slot_id: SlotId,
    pub fire_at: NaiveDateTime,
    pub precision: AlarmPrecision,
    pub payload: ReminderPayload,
}

/// The platform facility that holds one-shot deferred triggers.
///
/// It has no query-by-prefix, so callers cancel by enumerating slot ids.
pub trait AlarmRegistry: Send + Sync {
    /// Arms a trigger at exactly `fire_at`, replacing anything in `slot`.
    fn schedule_exact(
        &self,
        slot: SlotId,
        fire_at: NaiveDateTime,
        payload: ReminderPayload,
    ) -> Result<(), AlarmError>;

    /// Arms a best-effort trigger, replacing anything in `slot`.
    fn schedule_inexact(
        &self,
        slot: SlotId,
        fire_at: NaiveDateTime,
        payload: ReminderPayload,
    ) -> Result<(), AlarmError>;

    /// Cancels the trigger in `slot`, if any.
    fn cancel(&self, slot: SlotId);

    /// All armed triggers ordered by fire time.
    fn pending(&self) -> Vec<PendingNotification>;
}

/// In-process registry backed by a concurrent map.
///
/// Can be snapshotted to a JSON file so triggers survive a restart of the
/// host process.
pub struct MemoryAlarmRegistry {
    entries: DashMap<SlotId, PendingNotification>,
    exact_allowed: AtomicBool,
}

impl MemoryAlarmRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            exact_allowed: AtomicBool::new(true),
        }
    }

    /// Models a platform where exact alarms need a permission that was not
    /// granted.
    pub fn set_exact_allowed(&self, allowed: bool) {
        self.exact_allowed.store(allowed, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slot: SlotId) -> Option<PendingNotification> {
        self.entries.get(&slot).map(|entry| entry.clone())
    }

    /// Earliest fire time among armed triggers.
    pub fn next_fire_at(&self) -> Option<NaiveDateTime> {
        self.entries.iter().map(|entry| entry.fire_at).min()
    }

    /// Removes and returns every trigger due at or before `now`, earliest
    /// first.
    pub fn take_due(&self, now: NaiveDateTime) -> Vec<PendingNotification> {
        let due_slots: Vec<SlotId> = self
            .entries
            .iter()
            .filter(|entry| entry.fire_at <= now)
            .map(|entry| *entry.key())
            .collect();

        let mut due: Vec<PendingNotification> = due_slots
            .into_iter()
            .filter_map(|slot| self.entries.remove(&slot).map(|(_, pending)| pending))
            .collect();
        due.sort_by_key(|p| (p.fire_at, p.slot_id));
        due
    }

    /// Writes all armed triggers to `path` as JSON.
    pub fn save_to(&self, path: &Path) -> Result<(), AlarmError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.pending())?;
        fs::write(path, json)?;
        debug!(path = %path.display(), count = self.len(), "Saved armed reminders");
        Ok(())
    }

    /// Restores triggers from `path`. A missing file yields an empty registry.
    pub fn load_from(path: &Path) -> Result<Self, AlarmError> {
        let registry = Self::new();
        if !path.exists() {
            return Ok(registry);
        }
        let content = fs::read_to_string(path)?;
        let pending: Vec<PendingNotification> = serde_json::from_str(&content)?;
        for p in pending {
            registry.entries.insert(p.slot_id, p);
        }
        debug!(path = %path.display(), count = registry.len(), "Loaded armed reminders");
        Ok(registry)
    }

    fn insert(
        &self,
        slot: SlotId,
        fire_at: NaiveDateTime,
        payload: ReminderPayload,
        precision: AlarmPrecision,
    ) {
        self.entries.insert(
            slot,
            PendingNotification {
                slot_id: slot,
                fire_at,
                precision,
                payload,
            },
        );
    }
}

impl Default for MemoryAlarmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmRegistry for MemoryAlarmRegistry {
    fn schedule_exact(
        &self,
        slot: SlotId,
        fire_at: NaiveDateTime,
        payload: ReminderPayload,
    ) -> Result<(), AlarmError> {
        if !self.exact_allowed.load(Ordering::Relaxed) {
            return Err(AlarmError::ExactAlarmDenied);
        }
        self.insert(slot, fire_at, payload, AlarmPrecision::Exact);
        Ok(())
    }

    fn schedule_inexact(
        &self,
        slot: SlotId,
        fire_at: NaiveDateTime,
        payload: ReminderPayload,
    ) -> Result<(), AlarmError> {
        self.insert(slot, fire_at, payload, AlarmPrecision::Inexact);
        Ok(())
    }

    fn cancel(&self, slot: SlotId) {
        self.entries.remove(&slot);
    }

    fn pending(&self) -> Vec<PendingNotification> {
        let mut all: Vec<PendingNotification> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by_key(|p| (p.fire_at, p.slot_id));
        all
    }
}

//! Class reminders: arming triggers ahead of each class and firing them.
mod alert;
mod dispatcher;
mod error;
mod registry;
mod scheduler;

pub use alert::{Alert, MemorySink, NotificationSink, TracingSink};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{AlarmError, NotifyError};
pub use registry::{
    AlarmPrecision, AlarmRegistry, MemoryAlarmRegistry, PendingNotification, ReminderPayload,
    SlotId, SLOT_BASE,
};
pub use scheduler::{
    ReminderScheduler, ScheduleReport, SchedulerConfig, HORIZON_DAYS, REMINDER_LEAD_MINUTES,
    SLOTS_PER_DAY,
};

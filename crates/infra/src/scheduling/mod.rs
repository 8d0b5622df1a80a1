//! Background scheduling for reminder cycles

pub mod error;
pub mod reminder_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use reminder_scheduler::{
    ReminderScheduler, ReminderSchedulerConfig, SchedulerState, SchedulerStatus,
};

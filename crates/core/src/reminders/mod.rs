//! Reminder cycles: scanning for due reminders and driving their dispatch

pub mod engine;
pub mod error;
pub mod ledger;
pub mod ports;
pub mod scanner;

pub use engine::{CycleSummary, EngineSettings, ReminderEngine};
pub use error::ReminderError;
pub use ledger::InMemoryNotificationLedger;
pub use ports::NotificationLedger;
pub use scanner::{ReminderScanner, ScheduledReminder};

//! # CalNotify Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for storage, channels and time
//! - The reminder scanner, dispatcher and engine
//! - Event management service
//!
//! ## Architecture Principles
//! - Only depends on `calnotify-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod clock;
pub mod events;
pub mod notifications;
pub mod reminders;
pub mod utils;

// Re-export specific items to avoid ambiguity
pub use clock::{Clock, FixedClock, ZonedClock};
pub use events::{EventRepository, EventService, EventStore};
pub use notifications::{
    Channel, ChannelError, DeliveryReceipt, DeliveryStatus, DispatchReport, DispatcherSettings,
    EmailMessage, EmailSender, Mailbox, MessagingSender, NotificationDispatcher, TextMessage,
};
pub use reminders::{
    CycleSummary, EngineSettings, InMemoryNotificationLedger, NotificationLedger, ReminderEngine,
    ReminderError, ReminderScanner, ScheduledReminder,
};
pub use utils::{redact_email, redact_phone};

//! Reminder delivery: channel ports, message templates and the dispatcher

pub mod dispatcher;
pub mod error;
pub mod ports;
pub mod report;
pub mod templates;

pub use dispatcher::{DispatcherSettings, NotificationDispatcher};
pub use error::{ChannelError, RecipientDataError};
pub use ports::{DeliveryReceipt, EmailMessage, EmailSender, Mailbox, MessagingSender, TextMessage};
pub use report::{Channel, DeliveryOutcome, DeliveryStatus, DispatchReport, RecipientLabel, SkipReason};

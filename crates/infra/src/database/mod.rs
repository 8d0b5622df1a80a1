//! Database implementations

pub mod event_repository;
pub mod manager;
pub mod notification_ledger;

pub use event_repository::SqliteEventRepository;
pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use notification_ledger::SqliteNotificationLedger;

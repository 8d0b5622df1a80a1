//! # CalNotify Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite event repository and notification ledger (r2d2 pool)
//! - Retrying HTTP client
//! - Notification providers (SendGrid email, Twilio messaging)
//! - The interval-driven reminder scheduler
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `calnotify-core`
//! - Contains all "impure" code (database, network, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::{SendGridEmailSender, TwilioMessagingSender};
pub use scheduling::{
    ReminderScheduler, ReminderSchedulerConfig, SchedulerError, SchedulerResult, SchedulerState,
    SchedulerStatus,
};

//! Shared helpers for core services

pub mod redaction;

pub use redaction::{redact_email, redact_phone};

//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CYCLE_TIMEOUT_SECS, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_FROM_NAME,
    DEFAULT_MESSAGING_PREFIX, DEFAULT_PORT, DEFAULT_SCAN_INTERVAL_SECS, DEFAULT_SEND_TIMEOUT_SECS,
    DEFAULT_TIMEZONE, SENDGRID_BASE_URL, TWILIO_BASE_URL,
};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub email: EmailConfig,
    pub messaging: MessagingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: DEFAULT_PORT }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Reminder scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Start the background loop when the server boots.
    pub enabled: bool,
    pub interval_seconds: u64,
    /// IANA time zone used to decide what "today" means.
    pub timezone: String,
    /// Skip reminders that were already delivered for the same day.
    pub dedupe: bool,
    pub cycle_timeout_seconds: u64,
    pub send_timeout_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: DEFAULT_SCAN_INTERVAL_SECS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            dedupe: true,
            cycle_timeout_seconds: DEFAULT_CYCLE_TIMEOUT_SECS,
            send_timeout_seconds: DEFAULT_SEND_TIMEOUT_SECS,
        }
    }
}

/// Email (SendGrid) channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
    pub base_url: String,
}

impl EmailConfig {
    /// The channel is usable only with both a key and a sender address.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
            && !self.from_email.trim().is_empty()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: String::new(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            base_url: SENDGRID_BASE_URL.to_string(),
        }
    }
}

/// Messaging (Twilio / WhatsApp) channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub account_sid: Option<String>,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    pub from_number: String,
    /// Channel prefix applied to both sender and recipient numbers.
    pub address_prefix: String,
    pub base_url: String,
}

impl MessagingConfig {
    pub fn is_configured(&self) -> bool {
        let present = |value: &Option<String>| {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        };
        present(&self.account_sid)
            && present(&self.auth_token)
            && !self.from_number.trim().is_empty()
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: String::new(),
            address_prefix: DEFAULT_MESSAGING_PREFIX.to_string(),
            base_url: TWILIO_BASE_URL.to_string(),
        }
    }
}

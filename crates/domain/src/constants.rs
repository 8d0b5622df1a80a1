//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Server defaults
pub const DEFAULT_PORT: u16 = 8080;

// Database defaults
pub const DEFAULT_DB_PATH: &str = "calnotify.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;

// Scheduler defaults
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 240;
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 20;

// Channel defaults
pub const DEFAULT_FROM_NAME: &str = "Calendar Reminder";
pub const DEFAULT_MESSAGING_PREFIX: &str = "whatsapp:";
pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
pub const TWILIO_BASE_URL: &str = "https://api.twilio.com";

// Event defaults
pub const DEFAULT_EVENT_COLOR: &str = "#007AFF";
pub const DEFAULT_EVENT_PRIORITY: &str = "medium";
pub const MAX_TITLE_LENGTH: usize = 200;

// Mobile views
pub const DEFAULT_UPCOMING_DAYS: u32 = 7;
pub const MAX_UPCOMING_DAYS: u32 = 90;

// Wire formats
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M";

//! Shared fixtures for `calnotify-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use calnotify_domain::{EmailConfig, MessagingConfig, NewEvent};
use calnotify_infra::database::DbManager;
use calnotify_infra::integrations::{SendGridEmailSender, TwilioMessagingSender};
use chrono::NaiveDate;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("calnotify-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// New event with a primary contact and no reminder flags.
pub fn new_event(title: &str, date: NaiveDate, email: &str, phone: &str) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: String::new(),
        date,
        time: "09:00".to_string(),
        location: String::new(),
        email: email.to_string(),
        phone: phone.to_string(),
        remind_same_day: false,
        remind_day_before: false,
        is_all_day: false,
        color: "#007AFF".to_string(),
        priority: "medium".to_string(),
        category: String::new(),
        notify_family: false,
        notify_father: false,
        notify_mother: false,
        child_tag: String::new(),
        family_members: String::new(),
        selected_children: String::new(),
    }
}

pub fn sendgrid(base_url: &str) -> Arc<SendGridEmailSender> {
    let config = EmailConfig {
        api_key: Some("SG.test-key".into()),
        from_email: "reminders@example.com".into(),
        from_name: "Calendar Reminder".into(),
        base_url: base_url.into(),
    };
    Arc::new(
        SendGridEmailSender::from_config(&config, Duration::from_secs(5))
            .expect("sendgrid sender should build"),
    )
}

pub fn twilio(base_url: &str) -> Arc<TwilioMessagingSender> {
    let config = MessagingConfig {
        account_sid: Some("AC123".into()),
        auth_token: Some("token".into()),
        from_number: "+14155238886".into(),
        address_prefix: "whatsapp:".into(),
        base_url: base_url.into(),
    };
    Arc::new(
        TwilioMessagingSender::from_config(&config, Duration::from_secs(5))
            .expect("twilio sender should build"),
    )
}

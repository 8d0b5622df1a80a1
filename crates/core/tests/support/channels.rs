//! Recording channel senders

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use calnotify_core::notifications::{
    ChannelError, DeliveryReceipt, EmailMessage, EmailSender, Mailbox, MessagingSender,
    TextMessage,
};

/// Email sender that records every message it accepts.
#[derive(Default)]
pub struct RecordingEmailSender {
    configured: bool,
    failing: Mutex<Vec<String>>,
    delay: Option<Duration>,
    pub sent: Mutex<Vec<EmailMessage>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl RecordingEmailSender {
    pub fn configured() -> Arc<Self> {
        Arc::new(Self { configured: true, ..Self::default() })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self { configured: true, delay: Some(delay), ..Self::default() })
    }

    /// Reject every message addressed to `address`.
    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().push(address.to_string());
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.to.email.clone()).collect()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn sender(&self) -> Option<Mailbox> {
        self.configured.then(|| Mailbox::new("reminders@example.com", Some("Calendar Reminder".into())))
    }

    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, ChannelError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&message.to.email) {
            return Err(ChannelError::Rejected { status: 400, body: "invalid recipient".into() });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(DeliveryReceipt { provider_id: Some(format!("email-{}", sent.len())) })
    }
}

/// Messaging sender that records every message it accepts.
#[derive(Default)]
pub struct RecordingMessagingSender {
    configured: bool,
    pub sent: Mutex<Vec<TextMessage>>,
}

impl RecordingMessagingSender {
    pub fn configured() -> Arc<Self> {
        Arc::new(Self { configured: true, ..Self::default() })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.to.clone()).collect()
    }
}

#[async_trait]
impl MessagingSender for RecordingMessagingSender {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn sender(&self) -> Option<String> {
        self.configured.then(|| "+14155238886".to_string())
    }

    async fn send(&self, message: &TextMessage) -> Result<DeliveryReceipt, ChannelError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(DeliveryReceipt { provider_id: Some("SM123".into()) })
    }
}

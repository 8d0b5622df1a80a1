//! Port interfaces for reminder delivery channels
//!
//! Email and messaging providers live in the infrastructure layer; the
//! dispatcher only sees these traits.

use async_trait::async_trait;
use serde::Serialize;

use super::error::ChannelError;

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    pub email: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self { email: email.into(), name }
    }
}

/// Plain-text email ready for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
}

/// Short text message. Numbers are raw; channel addressing is the sender's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Acknowledgement from a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id, when the provider returns one.
    pub provider_id: Option<String>,
}

/// Trait for sending reminder emails
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Whether credentials and a sender address are present
    fn is_configured(&self) -> bool;

    /// Sender mailbox used as `from`, `None` when unconfigured
    fn sender(&self) -> Option<Mailbox>;

    /// Deliver one message. Unconfigured senders return `ChannelError::Unconfigured`.
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, ChannelError>;
}

/// Trait for sending reminder text messages
#[async_trait]
pub trait MessagingSender: Send + Sync {
    /// Whether credentials and a sender number are present
    fn is_configured(&self) -> bool;

    /// Sender number used as `from`, `None` when unconfigured
    fn sender(&self) -> Option<String>;

    /// Deliver one message. Unconfigured senders return `ChannelError::Unconfigured`.
    async fn send(&self, message: &TextMessage) -> Result<DeliveryReceipt, ChannelError>;
}

//! Error types for reminder delivery

use thiserror::Error;

/// Failure reported by a channel sender.
///
/// `Unconfigured` is a skip, not a failure: the dispatcher records it as such
/// and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel is not configured")]
    Unconfigured,

    #[error("provider rejected the message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("send failed: {0}")]
    SendFailure(String),

    #[error("send timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl ChannelError {
    /// Stable label for structured logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Rejected { .. } => "rejected",
            Self::SendFailure(_) => "send_failure",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Malformed family data on an event. Aborts only the family fan-out.
#[derive(Debug, Error)]
pub enum RecipientDataError {
    #[error("malformed family members: {0}")]
    FamilyMembers(#[source] serde_json::Error),

    #[error("malformed selected children: {0}")]
    SelectedChildren(#[source] serde_json::Error),
}

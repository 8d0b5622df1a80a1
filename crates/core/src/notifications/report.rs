//! Dispatch outcome model

use calnotify_domain::{impl_wire_enum_conversions, ReminderKind};
use serde::{Deserialize, Serialize};

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Messaging,
}

impl_wire_enum_conversions!(Channel {
    Email => "email",
    Messaging => "messaging",
});

/// Who an outcome refers to, without contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecipientLabel {
    Primary,
    Family { role: String, name: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ChannelUnconfigured,
    MissingAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent { provider_id: Option<String> },
    Skipped(SkipReason),
    Failed(String),
}

/// Result of one channel attempt for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub recipient: RecipientLabel,
    pub channel: Channel,
    pub status: DeliveryStatus,
}

/// Everything that happened while dispatching one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub event_id: i64,
    pub kind: ReminderKind,
    pub outcomes: Vec<DeliveryOutcome>,
    /// Set when family data could not be parsed; the family step was skipped.
    pub family_error: Option<String>,
}

impl DispatchReport {
    pub fn new(event_id: i64, kind: ReminderKind) -> Self {
        Self { event_id, kind, outcomes: Vec::new(), family_error: None }
    }

    pub fn sent_count(&self) -> usize {
        self.count(|status| matches!(status, DeliveryStatus::Sent { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, DeliveryStatus::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|status| matches!(status, DeliveryStatus::Skipped(_)))
    }

    pub fn any_sent(&self) -> bool {
        self.sent_count() > 0
    }

    /// Outcomes for one channel, in recipient order.
    pub fn for_channel(&self, channel: Channel) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(move |outcome| outcome.channel == channel)
    }

    fn count(&self, predicate: impl Fn(&DeliveryStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| predicate(&outcome.status)).count()
    }
}

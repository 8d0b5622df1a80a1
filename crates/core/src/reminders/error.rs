//! Error types for reminder cycles

use calnotify_domain::{CalNotifyError, DateRange};
use thiserror::Error;

/// Errors that abort a reminder cycle
#[derive(Debug, Clone, Error)]
pub enum ReminderError {
    /// The event store failed; no partial results are produced
    #[error("event store query failed for {range}: {source}")]
    StoreQueryFailure {
        range: DateRange,
        #[source]
        source: CalNotifyError,
    },

    /// The event scan exceeded the cycle budget
    #[error("reminder scan timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl ReminderError {
    /// Stable label for structured logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StoreQueryFailure { .. } => "store_query_failure",
            Self::Timeout { .. } => "timeout",
        }
    }
}

impl From<ReminderError> for CalNotifyError {
    fn from(err: ReminderError) -> Self {
        match err {
            ReminderError::StoreQueryFailure { source, .. } => source,
            ReminderError::Timeout { .. } => Self::Internal(err.to_string()),
        }
    }
}

//! Scheduler error types

use calnotify_core::ReminderError;
use calnotify_domain::CalNotifyError;
use thiserror::Error;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// A manually requested cycle failed
    #[error("Reminder cycle failed: {0}")]
    Cycle(#[from] ReminderError),

    /// The background task did not finish within the join timeout
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let domain_err = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                CalNotifyError::InvalidInput(err.to_string())
            }
            SchedulerError::Cycle(cycle_err) => cycle_err.into(),
            SchedulerError::Timeout { .. } | SchedulerError::TaskJoinFailed(_) => {
                CalNotifyError::Internal(err.to_string())
            }
        };
        InfraError(domain_err)
    }
}

impl From<SchedulerError> for CalNotifyError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

//! Tracing setup and logging helpers

use calnotify_domain::CalNotifyError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,calnotify=debug";

/// Environment variable selecting the output format (`json` or `pretty`)
pub const LOG_FORMAT_ENV: &str = "CALNOTIFY_LOG_FORMAT";

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if result.is_ok() {
        tracing::debug!(json, "tracing initialised");
    }
}

/// Convert a `CalNotifyError` into a stable label suitable for logging.
#[inline]
pub const fn error_label(error: &CalNotifyError) -> &'static str {
    match error {
        CalNotifyError::Database(_) => "database",
        CalNotifyError::Config(_) => "config",
        CalNotifyError::Network(_) => "network",
        CalNotifyError::NotFound(_) => "not_found",
        CalNotifyError::InvalidInput(_) => "invalid_input",
        CalNotifyError::Internal(_) => "internal",
    }
}

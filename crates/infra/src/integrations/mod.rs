//! Notification provider integrations
//!
//! Each provider implements a core channel port on top of the shared
//! [`HttpClient`](crate::http::HttpClient).

pub mod sendgrid;
pub mod twilio;

pub use sendgrid::SendGridEmailSender;
pub use twilio::TwilioMessagingSender;

use calnotify_core::ChannelError;
use calnotify_domain::CalNotifyError;
use reqwest::Response;

/// Provider error bodies are echoed into logs; keep them short.
const MAX_ERROR_BODY_CHARS: usize = 512;

fn transport_failure(err: CalNotifyError) -> ChannelError {
    ChannelError::SendFailure(err.to_string())
}

async fn rejection(response: Response) -> ChannelError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ChannelError::Rejected { status, body: body.chars().take(MAX_ERROR_BODY_CHARS).collect() }
}

//! SendGrid v3 email sender

use std::time::Duration;

use async_trait::async_trait;
use calnotify_core::{ChannelError, DeliveryReceipt, EmailMessage, EmailSender, Mailbox};
use calnotify_domain::{EmailConfig, Result};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use super::{rejection, transport_failure};
use crate::http::HttpClient;

const MAIL_SEND_PATH: &str = "/v3/mail/send";
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// Email channel backed by the SendGrid mail send API.
///
/// Built from [`EmailConfig`]; when the key or sender address is missing the
/// sender stays unconfigured and every send is a skip.
pub struct SendGridEmailSender {
    http_client: HttpClient,
    api_key: Option<String>,
    from: Option<Mailbox>,
    endpoint: String,
}

impl SendGridEmailSender {
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> Result<Self> {
        let configured = config.is_configured();
        let from = configured.then(|| {
            let name = config.from_name.trim();
            Mailbox::new(config.from_email.trim(), (!name.is_empty()).then(|| name.to_string()))
        });

        Ok(Self {
            http_client: HttpClient::with_timeout(timeout)?,
            api_key: if configured { config.api_key.clone() } else { None },
            from,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), MAIL_SEND_PATH),
        })
    }
}

#[derive(Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a Mailbox> for Address<'a> {
    fn from(mailbox: &'a Mailbox) -> Self {
        Self { email: &mailbox.email, name: mailbox.name.as_deref() }
    }
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'static str,
    value: &'a str,
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.from.is_some()
    }

    fn sender(&self) -> Option<Mailbox> {
        self.from.clone()
    }

    async fn send(&self, message: &EmailMessage) -> std::result::Result<DeliveryReceipt, ChannelError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ChannelError::Unconfigured);
        };

        let payload = MailSendRequest {
            personalizations: [Personalization { to: [Address::from(&message.to)] }],
            from: Address::from(&message.from),
            subject: &message.subject,
            content: [Content { mime: "text/plain", value: &message.body }],
        };

        let request = self
            .http_client
            .request(Method::POST, &self.endpoint)
            .bearer_auth(api_key)
            .json(&payload);

        let response = self.http_client.send(request).await.map_err(transport_failure)?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(response).await);
        }

        let provider_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        debug!(%status, provider_id = provider_id.as_deref().unwrap_or(""), "SendGrid accepted email");

        Ok(DeliveryReceipt { provider_id })
    }
}

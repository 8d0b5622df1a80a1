//! Twilio messaging sender (WhatsApp by default)

use std::time::Duration;

use async_trait::async_trait;
use calnotify_core::{ChannelError, DeliveryReceipt, MessagingSender, TextMessage};
use calnotify_domain::{MessagingConfig, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use super::{rejection, transport_failure};
use crate::http::HttpClient;

struct Credentials {
    account_sid: String,
    auth_token: String,
    from_number: String,
}

/// Messaging channel backed by the Twilio Messages API.
///
/// The configured address prefix (`whatsapp:` by default) is applied to both
/// sender and recipient of every message.
pub struct TwilioMessagingSender {
    http_client: HttpClient,
    credentials: Option<Credentials>,
    address_prefix: String,
    base_url: String,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

impl TwilioMessagingSender {
    pub fn from_config(config: &MessagingConfig, timeout: Duration) -> Result<Self> {
        let credentials = match (&config.account_sid, &config.auth_token) {
            (Some(sid), Some(token)) if config.is_configured() => Some(Credentials {
                account_sid: sid.trim().to_string(),
                auth_token: token.trim().to_string(),
                from_number: config.from_number.trim().to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            http_client: HttpClient::with_timeout(timeout)?,
            credentials,
            address_prefix: config.address_prefix.trim().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Prefix a raw number, leaving already-prefixed addresses alone.
    pub fn address(&self, number: &str) -> String {
        let number = number.trim();
        if self.address_prefix.is_empty() || number.starts_with(&self.address_prefix) {
            number.to_string()
        } else {
            format!("{}{}", self.address_prefix, number)
        }
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!("{}/2010-04-01/Accounts/{}/Messages.json", self.base_url, account_sid)
    }
}

#[async_trait]
impl MessagingSender for TwilioMessagingSender {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn sender(&self) -> Option<String> {
        self.credentials.as_ref().map(|c| c.from_number.clone())
    }

    async fn send(&self, message: &TextMessage) -> std::result::Result<DeliveryReceipt, ChannelError> {
        let Some(credentials) = self.credentials.as_ref() else {
            return Err(ChannelError::Unconfigured);
        };

        let to = self.address(&message.to);
        let from = self.address(&message.from);
        let form = [("To", to.as_str()), ("From", from.as_str()), ("Body", message.body.as_str())];

        let request = self
            .http_client
            .request(Method::POST, self.messages_url(&credentials.account_sid))
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&form);

        let response = self.http_client.send(request).await.map_err(transport_failure)?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(response).await);
        }

        let provider_id = match response.json::<MessageResource>().await {
            Ok(resource) => resource.sid,
            Err(err) => {
                debug!(error = %err, "Twilio response body was not a message resource");
                None
            }
        };
        debug!(%status, provider_id = provider_id.as_deref().unwrap_or(""), "Twilio accepted message");

        Ok(DeliveryReceipt { provider_id })
    }
}

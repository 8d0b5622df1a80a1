//! Shared HTTP client for provider integrations
//!
//! One attempt per request. Reminder sends are never retried within a
//! cycle; the next cycle is the retry.

use std::time::Duration;

use calnotify_domain::Result;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::into_domain;

const USER_AGENT: &str = concat!("calnotify/", env!("CARGO_PKG_VERSION"));

/// HTTP client with a request timeout and the service user agent.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client whose requests are bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::builder().timeout(timeout).build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request once.
    ///
    /// Any response, including 4xx and 5xx, is returned to the caller as-is;
    /// transport failures become `CalNotifyError::Network`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(into_domain)?;
        let method = request.method().clone();
        let url = redact_url(request.url());

        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(into_domain(err))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: USER_AGENT.to_string() }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(into_domain)?;

        Ok(HttpClient { client })
    }
}

/// Provider URLs embed account identifiers; logs keep only scheme, host and
/// the first path segment.
fn redact_url(url: &reqwest::Url) -> String {
    let first_segment = url.path_segments().and_then(|mut segments| segments.next()).unwrap_or("");
    format!("{}://{}/{}", url.scheme(), url.host_str().unwrap_or("unknown"), first_segment)
}

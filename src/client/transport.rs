//! Generic REST transport
//!
//! Provides the [`Transport`] trait used by every resource sub-client, and
//! [`HttpTransport`], the reqwest-backed implementation that talks to a real
//! cluster. Non-2xx statuses are NOT errors at this layer: callers inspect
//! [`RawResponse::status`] themselves.

use super::{Auth, ClientError, Result};
use async_trait::async_trait;
use owo_colors::OwoColorize;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossy on invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Whether the body carries nothing (empty, whitespace or `{}`).
    pub fn is_empty_body(&self) -> bool {
        let text = self.text();
        let trimmed = text.trim();
        trimmed.is_empty() || trimmed == "{}"
    }
}

/// Sends one request to the cluster and returns the raw answer.
///
/// When `body` is `Some`, it is serialized to JSON and sent with
/// `Content-Type: application/json`. When `None`, no content type is sent.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse>;

    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.send(Method::GET, path, None).await
    }

    async fn put(&self, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.send(Method::PUT, path, body).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.send(Method::POST, path, body).await
    }

    async fn delete(&self, path: &str) -> Result<RawResponse> {
        self.send(Method::DELETE, path, None).await
    }
}

/// Connection options beyond URL and credentials.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub insecure_skip_tls_verify: bool,
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            insecure_skip_tls_verify: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// reqwest-backed transport bound to one cluster URL.
///
/// # Example
/// ```no_run
/// use searchctl::client::{Auth, HttpTransport, Transport, TransportOptions};
/// use url::Url;
///
/// # async fn example() -> searchctl::client::Result<()> {
/// let url = Url::parse("http://localhost:9200")?;
/// let transport = HttpTransport::try_new(url, &Auth::None, TransportOptions::default())?;
/// let response = transport.get("/_cluster/health").await?;
/// println!("{}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    pub fn try_new(url: Url, auth: &Auth, options: TransportOptions) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(value) = auth.header_value() {
            headers.insert(reqwest::header::AUTHORIZATION, value.parse()?);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure_skip_tls_verify)
            .build()?;
        log::debug!("Transport ready for {} (auth: {})", url.as_str().cyan(), auth);
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Join the base URL and a request path (which may carry a query).
    fn endpoint(&self, path: &str) -> String {
        let base = self.url.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        let endpoint = self.endpoint(path);
        log::debug!("{} {}", method.as_str().green(), endpoint);

        let mut request = self.client.request(method, &endpoint);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        log::debug!("{} {}", status.to_string().bright_black(), path);
        Ok(RawResponse { status, body })
    }
}

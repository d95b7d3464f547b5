//! Indodax API Client
//!
//! Two primitives back every tool:
//! - [`IndodaxClient::private_post`] signs a form payload and POSTs it to `tapi`
//! - [`IndodaxClient::public_get`] GETs a public market data path
//!
//! Responses come back as raw JSON. Exchange-level errors inside a 2xx body
//! are not inspected. There is no retry: a failed call is reported once.
//!
//! # Example
//!
//! ```no_run
//! use indodax_mcp::indodax::{Credentials, IndodaxClient, PublicEndpoint};
//! use indodax_mcp::indodax::requests::GetInfo;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = IndodaxClient::new(Credentials::new("api_key", "api_secret"))?;
//!
//!     let ticker = client.public(&PublicEndpoint::ticker(Some("btc_idr"))).await?;
//!     println!("{}", ticker);
//!
//!     let info = client.call(&GetInfo::default()).await?;
//!     println!("{}", info);
//!     Ok(())
//! }
//! ```

use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::auth::Credentials;
use super::payload::Payload;
use super::public::PublicEndpoint;
use super::requests::PrivateRequest;
use crate::error::{IndodaxError, IndodaxResult};

/// Private (trade API) endpoint
pub const PRIVATE_API_URL: &str = "https://indodax.com/tapi";

/// Base URL for public market data endpoints
pub const PUBLIC_API_URL: &str = "https://indodax.com/api";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout duration
    pub timeout: Duration,
    /// Signed POST endpoint
    pub private_url: String,
    /// Public GET base, without trailing slash
    pub public_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            private_url: PRIVATE_API_URL.to_string(),
            public_url: PUBLIC_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_private_url(mut self, url: impl Into<String>) -> Self {
        self.private_url = url.into();
        self
    }

    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// A payload ready to send: the exact body bytes and their signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub body: String,
    pub signature: String,
}

/// Indodax REST client
///
/// Cheap to clone; credentials are shared and never mutated.
#[derive(Debug, Clone)]
pub struct IndodaxClient {
    credentials: Arc<Credentials>,
    http_client: Client,
    config: ClientConfig,
}

impl IndodaxClient {
    /// Create a new client with default configuration
    pub fn new(credentials: Credentials) -> IndodaxResult<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> IndodaxResult<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            credentials: Arc::new(credentials),
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stamp, encode and sign a payload without sending it
    ///
    /// A `timestamp` in epoch milliseconds is added unless the payload
    /// already carries `nonce` or `timestamp`.
    pub fn prepare(&self, mut payload: Payload) -> IndodaxResult<SignedRequest> {
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        payload.ensure_fresh(now_ms);

        let body = payload.encode()?;
        let signature = self.credentials.sign(&body);
        Ok(SignedRequest { body, signature })
    }

    /// Make an authenticated POST to the private endpoint
    pub async fn private_post(&self, payload: Payload) -> IndodaxResult<Value> {
        let method = payload.method().unwrap_or("?").to_string();
        let signed = self.prepare(payload)?;

        debug!(method = %method, "POST {}", self.config.private_url);

        let response = self
            .http_client
            .post(&self.config.private_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Key", self.credentials.api_key())
            .header("Sign", signed.signature)
            .body(signed.body)
            .send()
            .await?;

        Self::read_json(response, &method).await
    }

    /// Call a typed private method
    pub async fn call<R: PrivateRequest>(&self, request: &R) -> IndodaxResult<Value> {
        self.private_post(request.to_payload()).await
    }

    /// Call a typed private method with an explicit nonce
    pub async fn call_with_nonce<R: PrivateRequest>(
        &self,
        request: &R,
        nonce: u64,
    ) -> IndodaxResult<Value> {
        self.private_post(request.to_payload().with("nonce", nonce))
            .await
    }

    /// Public URL for the given path segments
    ///
    /// Each segment is percent-encoded, so `/`, `?` and `#` inside a pair id
    /// cannot change the path or add a query.
    pub fn public_url(&self, segments: &[&str]) -> IndodaxResult<Url> {
        let mut url = Url::parse(&self.config.public_url)
            .map_err(|e| IndodaxError::Config(format!("public URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                IndodaxError::Config(format!(
                    "public URL {} cannot have a path",
                    self.config.public_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a public endpoint given its path segments, e.g. `["ticker", "btc_idr"]`
    pub async fn public_get(&self, segments: &[&str]) -> IndodaxResult<Value> {
        let url = self.public_url(segments)?;
        debug!("GET {}", url);

        let response = self.http_client.get(url).send().await?;
        Self::read_json(response, &segments.join("/")).await
    }

    pub async fn public(&self, endpoint: &PublicEndpoint) -> IndodaxResult<Value> {
        self.public_get(&endpoint.segments()).await
    }

    async fn read_json(response: reqwest::Response, what: &str) -> IndodaxResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("{} failed with HTTP {}", what, status);
            return Err(IndodaxError::Status { status, body: text });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

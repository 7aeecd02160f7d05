//! The transport collaborator.
//!
//! The gateway talks to the counterparty through the [`Transport`] trait so
//! the orchestration can be exercised against an in-memory double. The
//! production implementation wraps a `reqwest` client with a request
//! timeout.
//!
//! No retry loop here by design: each request carries a one-time signature,
//! and replaying it with a stale nonce would be rejected upstream. Transient
//! failures surface to the caller, who signs a fresh request if retrying.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::error::GatewayResult;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl TransportResponse {
    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends one signed request and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange.
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> GatewayResult<TransportResponse>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GatewayError::Http`] when the client cannot be
    /// constructed.
    pub fn new() -> GatewayResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GatewayError::Http`] when the client cannot be
    /// constructed.
    pub fn with_timeout(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> GatewayResult<TransportResponse> {
        let mut request = self.client.request(method, url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

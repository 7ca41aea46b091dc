//! HTTP transport abstraction
//!
//! A [`Transport`] performs exactly one HTTP exchange. It knows nothing
//! about retries or timeouts; those belong to
//! [`ResilientClient`](super::ResilientClient). Any error returned by a
//! transport is treated as a network-level failure, while every HTTP
//! response, whatever its status, is a success at this layer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::client::{ApiResponse, Method, RequestOptions};
use crate::error::{NitroError, Result};

/// One-shot HTTP exchange used by the resilient client.
///
/// Implementations must be cancel-safe: the resilient client drops the
/// returned future when an attempt exceeds its timeout.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send a request to an absolute URL and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error when the exchange cannot be completed at the
    /// transport level (connection refused, reset, DNS failure, body read
    /// failure).
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<ApiResponse>;
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest-backed transport
    ///
    /// No overall request timeout is configured on the reqwest client; the
    /// resilient client bounds each attempt instead.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use nitro::client::ReqwestTransport;
    ///
    /// let transport = ReqwestTransport::new();
    /// assert!(transport.is_ok());
    /// ```
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("nitro/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NitroError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<ApiResponse> {
        let mut request = match options.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(NitroError::Http)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(NitroError::Http)?;

        Ok(ApiResponse::new(status, body))
    }
}

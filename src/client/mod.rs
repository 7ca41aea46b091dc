//! Resilient request client
//!
//! Wraps a single logical backend call with a per-attempt timeout, a bounded
//! number of retries and a one-shot wake-up notification. Backends hosted on
//! sleep/wake tiers take a while to answer the first request after idling;
//! the [`WakeSignal`] lets the caller show a "server is waking up" state as
//! soon as the first attempt fails, without waiting for the retries.
//!
//! Only transport failures (timeouts and network errors) are retried. Any
//! HTTP response, including 4xx/5xx, is handed back on the attempt that
//! produced it.
//!
//! # Examples
//!
//! ```no_run
//! use nitro::client::{RequestOptions, RequestPolicy, ResilientClient};
//!
//! # async fn example() -> nitro::error::Result<()> {
//! let client = ResilientClient::with_reqwest("http://localhost:8000")?;
//! let response = client
//!     .call("/health", &RequestOptions::get(), &RequestPolicy::default())
//!     .await?;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{NitroError, Result};

pub mod transport;
pub use transport::{ReqwestTransport, Transport};

#[cfg(test)]
pub mod fake;

/// Default pause between a failed attempt and the next one
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(2000);

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Method, headers and body of a request. Opaque to the retry logic.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// HTTP method
    pub method: Method,
    /// Extra headers, sent in order after the client's default headers
    pub headers: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    /// A bodiless GET request
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST request carrying a JSON body
    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// A bodiless DELETE request
    pub fn delete() -> Self {
        Self {
            method: Method::Delete,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Retry and timeout policy for one logical call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    /// Additional attempts after the first one
    pub retries: u32,
    /// Upper bound for each individual attempt
    pub timeout: Duration,
    /// Pause between a failed attempt and the next one
    pub backoff: Duration,
}

impl RequestPolicy {
    /// Create a policy with the default backoff
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use nitro::client::RequestPolicy;
    ///
    /// let policy = RequestPolicy::new(3, Duration::from_secs(10));
    /// assert_eq!(policy.max_attempts(), 4);
    /// assert_eq!(policy.backoff, Duration::from_millis(2000));
    /// ```
    pub fn new(retries: u32, timeout: Duration) -> Self {
        Self {
            retries,
            timeout,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Override the backoff interval
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Total number of attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Check that attempts can complete at all
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::Config`] if the per-attempt timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(
                NitroError::Config("Request timeout must be greater than zero".to_string()).into(),
            );
        }
        Ok(())
    }
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(60))
    }
}

/// Raw HTTP response as seen by the resilient client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl ApiResponse {
    /// Create a response from a status and body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`NitroError::HttpStatus`]
    ///
    /// # Examples
    ///
    /// ```
    /// use nitro::client::ApiResponse;
    ///
    /// assert!(ApiResponse::new(200, "{}").error_for_status("/chat").is_ok());
    /// assert!(ApiResponse::new(502, "bad gateway").error_for_status("/chat").is_err());
    /// ```
    pub fn error_for_status(self, endpoint: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(NitroError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: self.status,
                body: self.body,
            }
            .into())
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| NitroError::Serialization(e).into())
    }
}

/// Side channel for the "backend is waking up" indicator.
///
/// `waking` is raised by the client on the first failed attempt of a
/// logical call, once per call. `awake` is never raised by the client; the
/// caller invokes it after the call eventually succeeds.
#[cfg_attr(test, mockall::automock)]
pub trait WakeSignal: Send + Sync {
    /// The first attempt against `endpoint` failed; the backend may be asleep
    fn waking(&self, endpoint: &str);

    /// The backend answered again
    fn awake(&self) {}
}

/// Structured log context for a single attempt
#[derive(Debug, Clone, Copy)]
struct RequestAttempt<'a> {
    endpoint: &'a str,
    method: Method,
    number: u32,
    retries_remaining: u32,
}

/// HTTP client with bounded timeout, bounded retry and wake notification
#[derive(Clone)]
pub struct ResilientClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    default_headers: Vec<(String, String)>,
    wake_signal: Option<Arc<dyn WakeSignal>>,
}

impl fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientClient")
            .field("base_url", &self.base_url.as_str())
            .field("transport", &self.transport)
            .field("default_headers", &self.default_headers.len())
            .field("wake_signal", &self.wake_signal.is_some())
            .finish()
    }
}

impl ResilientClient {
    /// Create a client for `base_url` over the given transport
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::Config`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| NitroError::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(NitroError::Config(format!(
                "Unsupported API base URL scheme: {}",
                base.scheme()
            ))
            .into());
        }

        // Joining relative endpoints replaces the last path segment unless
        // the base path ends with a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            base_url: base,
            transport,
            default_headers: Vec::new(),
            wake_signal: None,
        })
    }

    /// Create a client backed by [`ReqwestTransport`]
    pub fn with_reqwest(base_url: &str) -> Result<Self> {
        Self::new(base_url, Arc::new(ReqwestTransport::new()?))
    }

    /// Register the wake-up notification hook
    pub fn with_wake_signal(mut self, signal: Arc<dyn WakeSignal>) -> Self {
        self.wake_signal = Some(signal);
        self
    }

    /// Add a header sent with every request
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The registered wake signal, if any
    pub fn wake_signal(&self) -> Option<&Arc<dyn WakeSignal>> {
        self.wake_signal.as_ref()
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Resolve an endpoint against the base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use nitro::client::ResilientClient;
    ///
    /// let client = ResilientClient::with_reqwest("https://api.example.com/v1").unwrap();
    /// assert_eq!(
    ///     client.url_for("/chat").unwrap(),
    ///     "https://api.example.com/v1/chat"
    /// );
    /// ```
    pub fn url_for(&self, endpoint: &str) -> Result<String> {
        let url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| NitroError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        Ok(url.into())
    }

    /// Perform one logical call under `policy`
    ///
    /// Makes up to `policy.retries + 1` attempts, each bounded by
    /// `policy.timeout`, sleeping `policy.backoff` between attempts. The
    /// wake signal fires on the first failed attempt only.
    ///
    /// # Returns
    ///
    /// The first HTTP response received, whatever its status
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::Timeout`] or [`NitroError::NetworkFailure`] for
    /// the last attempt once every attempt has failed, or
    /// [`NitroError::Config`] if the endpoint cannot be resolved or the
    /// policy has a zero timeout.
    pub async fn call(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        policy: &RequestPolicy,
    ) -> Result<ApiResponse> {
        policy.validate()?;
        let url = self.url_for(endpoint)?;
        let options = self.merge_default_headers(options);
        let max_attempts = policy.max_attempts();
        let timeout_ms = u64::try_from(policy.timeout.as_millis()).unwrap_or(u64::MAX);

        let mut notified = false;
        let mut number = 0;

        loop {
            number += 1;
            let attempt = RequestAttempt {
                endpoint,
                method: options.method,
                number,
                retries_remaining: max_attempts - number,
            };
            tracing::debug!(
                endpoint = attempt.endpoint,
                method = %attempt.method,
                attempt = attempt.number,
                retries_remaining = attempt.retries_remaining,
                "Sending request"
            );

            let error = match tokio::time::timeout(policy.timeout, self.transport.send(&url, &options))
                .await
            {
                Ok(Ok(response)) => {
                    tracing::debug!(
                        endpoint = attempt.endpoint,
                        status = response.status,
                        attempt = attempt.number,
                        "Received response"
                    );
                    return Ok(response);
                }
                Ok(Err(e)) => NitroError::NetworkFailure {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                },
                Err(_) => NitroError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout_ms,
                },
            };

            tracing::warn!(
                endpoint = attempt.endpoint,
                attempt = attempt.number,
                retries_remaining = attempt.retries_remaining,
                "Request attempt failed: {}",
                error
            );

            if !notified {
                notified = true;
                if let Some(signal) = &self.wake_signal {
                    signal.waking(endpoint);
                }
            }

            if attempt.retries_remaining == 0 {
                return Err(error.into());
            }

            tokio::time::sleep(policy.backoff).await;
        }
    }

    fn merge_default_headers(&self, options: &RequestOptions) -> RequestOptions {
        if self.default_headers.is_empty() {
            return options.clone();
        }
        let mut headers = self.default_headers.clone();
        headers.extend(options.headers.iter().cloned());
        RequestOptions {
            method: options.method,
            headers,
            body: options.body.clone(),
        }
    }
}

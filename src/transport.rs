//! HTTP transport for upstream API calls
//!
//! Wraps the HTTP client behind a small trait ("perform a GET with query
//! parameters and headers, return the status code and parsed JSON body") so
//! the fetch clients can be exercised in tests with stub transports that
//! never touch the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Request timeout applied to every upstream call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Delay before the single retry of a failed request
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Errors that can occur while performing an upstream request
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Status code and parsed JSON body of an upstream response
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

impl JsonResponse {
    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform an HTTP GET against an upstream service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET request with the given query parameters and headers,
    /// returning the status code and parsed JSON body.
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<JsonResponse, TransportError>;
}

/// Production transport backed by reqwest
///
/// Applies a hard request timeout and retries once, after a short backoff,
/// when the failure happened below HTTP (connect error or timeout). HTTP
/// error statuses are returned to the caller unchanged and never retried.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport with the default timeout configuration
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Creates a transport around a custom reqwest client
    #[allow(dead_code)]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn request_once(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<JsonResponse, TransportError> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        // Error bodies are not required to be JSON; the status is what the
        // caller reports in that case.
        let body = if (200..300).contains(&status) {
            serde_json::from_str(&text)?
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(JsonResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<JsonResponse, TransportError> {
        match self.request_once(url, query, headers).await {
            Err(TransportError::RequestFailed(err)) if err.is_connect() || err.is_timeout() => {
                tracing::debug!("retrying {url} after transport error: {err}");
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.request_once(url, query, headers).await
            }
            other => other,
        }
    }
}

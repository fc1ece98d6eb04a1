use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use thiserror::Error;

use crate::util::validate_url;

/// Errors that can occur while retrieving a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source URL failed validation (bad scheme, private host, ...)
    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Retrieval settings, read from the `[fetch]` table of the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a 429, a 5xx or a truncated body.
    pub max_retries: u32,
    /// First backoff delay in milliseconds; doubled on every retry.
    pub backoff_base_ms: u64,
    /// Largest accepted response body in bytes.
    pub max_document_bytes: usize,
    /// Allow localhost and private network addresses as sources.
    pub allow_private_hosts: bool,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 2_000,
            max_document_bytes: 10 * 1024 * 1024, // 10MB
            allow_private_hosts: false,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchSettings {
    /// Backoff before retry number `attempt` (0-based): base, 2x base, 4x base...
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

/// Downloads a feed document and returns it as text.
///
/// # Behavior
///
/// - The URL must be http(s); private and loopback hosts are refused unless
///   `allow_private_hosts` is set
/// - Each request is bounded by `timeout_secs`
/// - 429 and 5xx responses, and bodies shorter than their `Content-Length`,
///   are retried with exponential backoff up to `max_retries` times
/// - Other non-2xx responses fail immediately
/// - Bodies larger than `max_document_bytes` are rejected
/// - Invalid UTF-8 is replaced rather than rejected; the XML reader reports
///   anything it cannot make sense of
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
    settings: &FetchSettings,
) -> Result<String, FetchError> {
    let url = validate_url(url, settings.allow_private_hosts)
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    let timeout = Duration::from_secs(settings.timeout_secs);
    let mut retry_count = 0;

    let bytes = loop {
        let response = tokio::time::timeout(timeout, client.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        let status = response.status();

        // EDGE-004: Handle rate limiting with exponential backoff
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            if retry_count >= settings.max_retries {
                return Err(FetchError::RateLimited(settings.max_retries));
            }

            let delay = settings.backoff(retry_count);
            tracing::warn!(
                url = %url,
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "Rate limited, backing off"
            );

            tokio::time::sleep(delay).await;
            retry_count += 1;
            continue;
        }

        if status.is_server_error() {
            if retry_count >= settings.max_retries {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }

            let delay = settings.backoff(retry_count);
            tracing::warn!(
                url = %url,
                status = %status,
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "Server error, retrying after delay"
            );

            tokio::time::sleep(delay).await;
            retry_count += 1;
            continue;
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        match read_limited_bytes(response, settings.max_document_bytes).await {
            Ok(bytes) => break bytes,
            Err(FetchError::IncompleteResponse { expected, received }) => {
                // EDGE-005: Retry truncated downloads
                if retry_count >= settings.max_retries {
                    return Err(FetchError::IncompleteResponse { expected, received });
                }

                let delay = settings.backoff(retry_count);
                tracing::debug!(
                    url = %url,
                    expected = expected,
                    received = received,
                    attempt = retry_count + 1,
                    "Retrying incomplete download"
                );

                tokio::time::sleep(delay).await;
                retry_count += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    };

    tracing::debug!(url = %url, bytes = bytes.len(), "Fetched feed document");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

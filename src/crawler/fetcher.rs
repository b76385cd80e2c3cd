//! HTTP fetcher implementation
//!
//! This module handles page requests for the pipeline, including:
//! - Building the HTTP client with an identifying user agent
//! - GET requests for page content
//! - Status classification against a configurable threshold
//! - Error classification (transport, upstream status, body read)

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors from the page stage. Each one only affects its own entry.
#[derive(Debug, Error)]
pub enum PageError {
    /// Connection refused, DNS failure, timeout before a response arrived
    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// The server answered with a status the policy rejects
    #[error("Upstream error for {url}: HTTP {status}")]
    Upstream { url: String, status: u16 },

    /// The response started but the body could not be read
    #[error("Failed to read body of {url}: {source}")]
    Read { url: String, source: reqwest::Error },
}

impl PageError {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Upstream { url, .. } | Self::Read { url, .. } => url,
        }
    }
}

/// Which response statuses count as deliverable content
///
/// Anything strictly below `reject_from` is accepted, so 4xx error pages are
/// delivered like any other page. Only statuses at or above the threshold are
/// rejected, and their bodies are never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    reject_from: u16,
}

impl StatusPolicy {
    /// Status at which responses start being rejected by default
    pub const DEFAULT_REJECT_FROM: u16 = 500;

    /// Creates a policy rejecting every status `>= reject_from`
    pub fn reject_from(reject_from: u16) -> Self {
        Self { reject_from }
    }

    /// The first rejected status
    pub fn threshold(&self) -> u16 {
        self.reject_from
    }

    /// Returns true if a response with this status is content
    pub fn accepts(&self, status: StatusCode) -> bool {
        status.as_u16() < self.reject_from
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self::reject_from(Self::DEFAULT_REJECT_FROM)
    }
}

/// Raw HTML of one fetched page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// The URL that was requested
    pub url: String,

    /// HTTP status of the response
    pub status_code: u16,

    /// Full response body
    pub body: String,
}

impl PageContent {
    /// Size of the body in bytes
    pub fn byte_len(&self) -> usize {
        self.body.len()
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sage::crawler::build_http_client;
///
/// let client = build_http_client().unwrap();
/// ```
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("sage/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page
///
/// Redirects follow the client's default policy. The body is read into memory
/// in full; there is no size cap.
///
/// | Condition | Result |
/// |-----------|--------|
/// | No response (connect, DNS, timeout) | `PageError::Transport` |
/// | Status `>= policy threshold` | `PageError::Upstream`, body not read |
/// | Body read fails | `PageError::Read` |
/// | Anything else, 4xx included | `PageContent` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The page URL
/// * `policy` - Which statuses are accepted
pub async fn fetch_page(
    client: &Client,
    url: &str,
    policy: StatusPolicy,
) -> Result<PageContent, PageError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| PageError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !policy.accepts(status) {
        return Err(PageError::Upstream {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if status.is_client_error() {
        tracing::warn!("Accepting HTTP {} page from {} as content", status.as_u16(), url);
    }

    let body = response.text().await.map_err(|source| PageError::Read {
        url: url.to_string(),
        source,
    })?;

    tracing::debug!("Fetched {} ({} bytes, HTTP {})", url, body.len(), status.as_u16());

    Ok(PageContent {
        url: url.to_string(),
        status_code: status.as_u16(),
        body,
    })
}

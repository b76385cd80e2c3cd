//! Sitemap handling module
//!
//! This module fetches a sitemap over HTTP and turns it into an ordered list of
//! [`SitemapEntry`] records. Sitemap indexes are expanded one level deep, child
//! sitemaps in document order.

mod parser;

pub use parser::{parse_lastmod, parse_sitemap, SitemapDocument, SitemapEntry, SitemapParseError};

use reqwest::Client;
use thiserror::Error;

/// Errors from the sitemap stage. All of them are fatal to a run.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Sitemap {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid sitemap {url}: {source}")]
    Parse {
        url: String,
        source: SitemapParseError,
    },
}

impl SitemapError {
    /// True for transport and status failures, false for parse failures
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Status { .. })
    }
}

/// Fetches a sitemap and returns its entries in document order
///
/// A `<sitemapindex>` is followed one level: each child sitemap is fetched in
/// turn and its entries appended. A child that is itself an index is rejected.
/// There is no retry; any failure ends the call.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The sitemap URL
///
/// # Returns
///
/// * `Ok(Vec<SitemapEntry>)` - Entries in delivery order
/// * `Err(SitemapError)` - Transport, status or parse failure
pub async fn fetch_sitemap(client: &Client, url: &str) -> Result<Vec<SitemapEntry>, SitemapError> {
    tracing::info!("Fetching sitemap {}", url);

    match fetch_document(client, url).await? {
        SitemapDocument::UrlSet(entries) => {
            tracing::info!("Sitemap {} lists {} pages", url, entries.len());
            Ok(entries)
        }
        SitemapDocument::Index(children) => {
            tracing::info!("Sitemap {} is an index of {} sitemaps", url, children.len());

            let mut entries = Vec::new();
            for child in &children {
                match fetch_document(client, child).await? {
                    SitemapDocument::UrlSet(child_entries) => {
                        tracing::debug!("Child sitemap {} lists {} pages", child, child_entries.len());
                        entries.extend(child_entries);
                    }
                    SitemapDocument::Index(_) => {
                        return Err(SitemapError::Parse {
                            url: child.clone(),
                            source: SitemapParseError::NestedIndex,
                        });
                    }
                }
            }

            tracing::info!("Sitemap index {} lists {} pages", url, entries.len());
            Ok(entries)
        }
    }
}

async fn fetch_document(client: &Client, url: &str) -> Result<SitemapDocument, SitemapError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SitemapError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SitemapError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| SitemapError::Fetch {
        url: url.to_string(),
        source,
    })?;

    parse_sitemap(&body).map_err(|source| SitemapError::Parse {
        url: url.to_string(),
        source,
    })
}

//! Sitemap XML parser
//!
//! Handles both `<urlset>` documents and `<sitemapindex>` documents. The root
//! element is sniffed with the streaming reader first, then the body is
//! deserialized with quick-xml's serde support.

use chrono::{DateTime, FixedOffset, NaiveDate};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::errors::serialize::DeError;
use serde::Deserialize;
use thiserror::Error;

/// Why a document is not a usable sitemap
#[derive(Debug, Error)]
pub enum SitemapParseError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to deserialize sitemap: {0}")]
    Deserialize(#[from] DeError),

    #[error("document has no root element")]
    NoRoot,

    #[error("expected <urlset> or <sitemapindex> root, found <{0}>")]
    UnexpectedRoot(String),

    #[error("nested sitemap indexes are not supported")]
    NestedIndex,
}

/// One `<url>` record of a sitemap
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// The page URL (`<loc>`)
    pub location: String,

    /// When the page last changed (`<lastmod>`)
    pub last_modified: Option<DateTime<FixedOffset>>,

    /// How often the page is expected to change (`<changefreq>`)
    pub change_frequency: Option<String>,

    /// Relative priority within the site (`<priority>`)
    pub priority: Option<f32>,
}

impl SitemapEntry {
    /// Creates an entry with only a location
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            last_modified: None,
            change_frequency: None,
            priority: None,
        }
    }
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapDocument {
    /// A `<urlset>` with its entries in document order
    UrlSet(Vec<SitemapEntry>),

    /// A `<sitemapindex>` with the child sitemap locations in document order
    Index(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawUrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<RawUrl>,
}

#[derive(Debug, Deserialize)]
struct RawUrl {
    #[serde(default)]
    loc: Option<String>,
    #[serde(default)]
    lastmod: Option<String>,
    #[serde(default)]
    changefreq: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSitemapIndex {
    #[serde(rename = "sitemap", default)]
    sitemaps: Vec<RawSitemapRef>,
}

#[derive(Debug, Deserialize)]
struct RawSitemapRef {
    #[serde(default)]
    loc: Option<String>,
}

/// Parses sitemap XML into a [`SitemapDocument`]
///
/// Records without a `<loc>` are skipped. Optional fields that cannot be
/// understood are dropped rather than failing the whole document.
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - A url set or a sitemap index
/// * `Err(SitemapParseError)` - The document is not sitemap XML
///
/// # Example
///
/// ```
/// use sage::sitemap::{parse_sitemap, SitemapDocument};
///
/// let xml = r#"<urlset><url><loc>https://example.com/</loc></url></urlset>"#;
/// match parse_sitemap(xml).unwrap() {
///     SitemapDocument::UrlSet(entries) => assert_eq!(entries[0].location, "https://example.com/"),
///     SitemapDocument::Index(_) => unreachable!(),
/// }
/// ```
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapParseError> {
    match root_element(xml)?.as_str() {
        "urlset" => {
            let raw: RawUrlSet = quick_xml::de::from_str(xml)?;
            let entries = raw.urls.into_iter().filter_map(into_entry).collect();
            Ok(SitemapDocument::UrlSet(entries))
        }
        "sitemapindex" => {
            let raw: RawSitemapIndex = quick_xml::de::from_str(xml)?;
            let locations = raw
                .sitemaps
                .into_iter()
                .filter_map(|sitemap| non_empty(sitemap.loc))
                .collect();
            Ok(SitemapDocument::Index(locations))
        }
        other => Err(SitemapParseError::UnexpectedRoot(other.to_string())),
    }
}

/// Returns the local name of the first element in the document
fn root_element(xml: &str) -> Result<String, SitemapParseError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                return Ok(String::from_utf8_lossy(element.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(SitemapParseError::NoRoot),
            Ok(_) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

fn into_entry(raw: RawUrl) -> Option<SitemapEntry> {
    let Some(location) = non_empty(raw.loc) else {
        tracing::warn!("Skipping sitemap <url> without a <loc>");
        return None;
    };

    Some(SitemapEntry {
        last_modified: non_empty(raw.lastmod).and_then(|value| parse_lastmod(&value)),
        change_frequency: non_empty(raw.changefreq),
        priority: non_empty(raw.priority).and_then(|value| value.parse::<f32>().ok()),
        location,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a W3C datetime as used by `<lastmod>`
///
/// Bare dates are read as midnight UTC.
pub fn parse_lastmod(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }

    // Minutes-only precision, e.g. 2024-01-02T03:04+01:00
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Some(parsed);
    }

    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().fixed_offset()),
        Err(_) => {
            tracing::debug!("Ignoring unparseable lastmod '{}'", value);
            None
        }
    }
}

//! HTML title extraction
//!
//! A title can come from several places in a page. Each place is a
//! [`TitleStrategy`]; a [`TitleExtractor`] tries its strategies in order and
//! returns the first non-empty result. The default extractor only looks at
//! `<meta name="twitter:title">`.

use crate::config::TitleSource;
use scraper::{Html, Selector};
use thiserror::Error;

/// Errors from the title stage. The pipeline never fails an entry on these.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Result type for title extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// One way of finding a title in a parsed document
pub trait TitleStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Returns the trimmed title, or `None` if this source has nothing
    fn extract(&self, document: &Html) -> ExtractResult<Option<String>>;
}

/// Title from the `content` of a `<meta>` tag
#[derive(Debug, Clone)]
pub struct MetaTitle {
    name: &'static str,
    selector: &'static str,
}

impl MetaTitle {
    /// `<meta name="twitter:title" content="...">`
    pub fn twitter() -> Self {
        Self {
            name: "twitter",
            selector: r#"meta[name="twitter:title"]"#,
        }
    }

    /// `<meta property="og:title" content="...">`
    pub fn open_graph() -> Self {
        Self {
            name: "open-graph",
            selector: r#"meta[property="og:title"]"#,
        }
    }
}

impl TitleStrategy for MetaTitle {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, document: &Html) -> ExtractResult<Option<String>> {
        let selector = compile(self.selector)?;

        // Only the first matching tag counts, even if its content is empty
        Ok(document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

/// Title from the document's `<title>` element
#[derive(Debug, Clone, Default)]
pub struct DocumentTitle;

impl TitleStrategy for DocumentTitle {
    fn name(&self) -> &'static str {
        "document"
    }

    fn extract(&self, document: &Html) -> ExtractResult<Option<String>> {
        let selector = compile("title")?;

        Ok(document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

fn compile(selector: &str) -> ExtractResult<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Ordered chain of title strategies
pub struct TitleExtractor {
    strategies: Vec<Box<dyn TitleStrategy>>,
}

impl TitleExtractor {
    /// Creates an extractor from explicit strategies
    pub fn new(strategies: Vec<Box<dyn TitleStrategy>>) -> Self {
        Self { strategies }
    }

    /// Creates an extractor from configured source names
    pub fn from_sources(sources: &[TitleSource]) -> Self {
        let strategies = sources
            .iter()
            .map(|source| -> Box<dyn TitleStrategy> {
                match source {
                    TitleSource::Twitter => Box::new(MetaTitle::twitter()),
                    TitleSource::OpenGraph => Box::new(MetaTitle::open_graph()),
                    TitleSource::Document => Box::new(DocumentTitle),
                }
            })
            .collect();

        Self::new(strategies)
    }

    /// Names of the strategies, in the order they are tried
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extracts a title from raw HTML
    ///
    /// Malformed markup is parsed leniently. An empty string means no
    /// strategy found anything; it is not an error.
    pub fn extract(&self, html: &str) -> ExtractResult<String> {
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            if let Some(title) = strategy.extract(&document)? {
                tracing::trace!("Title found by {} strategy: {}", strategy.name(), title);
                return Ok(title);
            }
        }

        Ok(String::new())
    }
}

impl Default for TitleExtractor {
    fn default() -> Self {
        Self::new(vec![Box::new(MetaTitle::twitter())])
    }
}

impl std::fmt::Debug for TitleExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleExtractor")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

/// Extracts the `twitter:title` of a page
///
/// # Example
///
/// ```
/// use sage::crawler::extract_title;
///
/// let html = r#"<html><head><meta name="twitter:title" content=" Hello "></head></html>"#;
/// assert_eq!(extract_title(html).unwrap(), "Hello");
/// ```
pub fn extract_title(html: &str) -> ExtractResult<String> {
    TitleExtractor::default().extract(html)
}

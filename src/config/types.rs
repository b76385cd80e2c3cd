use crate::crawler::StatusPolicy;
use crate::pipeline::DEFAULT_DELAY;
use serde::Deserialize;

/// Main configuration structure for Sage
///
/// Every section is optional in the file. Values that are left empty can be
/// filled from the environment with [`apply_env`](super::apply_env).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sitemap: SitemapConfig,
    pub delivery: DeliveryConfig,
    pub smtp: SmtpConfig,
    pub pipeline: PipelineConfig,
}

/// Where the crawl starts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// URL of the sitemap (or sitemap index) to crawl
    pub url: String,
}

/// Who receives the pages and how they are packaged
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Recipient address for every page
    pub recipient: String,

    /// Sender address; falls back to the SMTP username when empty
    pub from: String,

    /// Inline HTML body or HTML file attachment
    pub mode: DeliveryMode,

    /// Text prepended to every subject line
    #[serde(rename = "subject-prefix")]
    pub subject_prefix: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            from: String::new(),
            mode: DeliveryMode::Body,
            subject_prefix: String::new(),
        }
    }
}

/// How a fetched page is placed into the outgoing email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// The page HTML is the email body
    Body,

    /// The page HTML is attached as an `.html` file
    Attachment,
}

/// SMTP relay settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub tls: TlsMode,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            tls: TlsMode::StartTls,
        }
    }
}

/// Transport security for the SMTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS
    #[serde(rename = "starttls")]
    StartTls,

    /// Implicit TLS from the first byte
    #[serde(rename = "tls")]
    Tls,

    /// No encryption at all (local relays only)
    #[serde(rename = "none")]
    None,
}

/// Crawl pacing and extraction behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between two consecutive entries (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Page responses with a status at or above this are rejected
    #[serde(rename = "reject-status")]
    pub reject_status: u16,

    /// Title sources to try, in order
    #[serde(rename = "title-sources")]
    pub title_sources: Vec<TitleSource>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
            reject_status: StatusPolicy::DEFAULT_REJECT_FROM,
            title_sources: vec![TitleSource::Twitter],
        }
    }
}

/// A place in the page markup a title can come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleSource {
    /// `<meta name="twitter:title">`
    Twitter,

    /// `<meta property="og:title">`
    OpenGraph,

    /// `<title>`
    Document,
}

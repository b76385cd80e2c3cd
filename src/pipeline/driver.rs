//! Pipeline driver - main run orchestration logic
//!
//! This module contains the main loop that turns a sitemap into a sequence of
//! deliveries:
//! - Fetching the sitemap once
//! - For every entry, in order: fetch page, extract title, compose and send
//! - Isolating per-entry failures
//! - Pausing between entries

use crate::config::{validate, Config, DeliveryMode};
use crate::crawler::{build_http_client, fetch_page, PageContent, StatusPolicy, TitleExtractor};
use crate::mail::{Attachment, Composer, EmailMessage, Mailer};
use crate::pipeline::delay::{Delay, TokioDelay};
use crate::pipeline::outcome::{DeliveryOutcome, OutcomeStatus};
use crate::sitemap::{fetch_sitemap, SitemapEntry};
use crate::state::RunState;
use crate::Result;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Per-run settings the driver needs, resolved from [`Config`]
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Address every page is sent to
    pub recipient: String,

    /// Sender address
    pub from: String,

    /// Inline body or attachment
    pub mode: DeliveryMode,

    /// Prepended to every subject when non-empty
    pub subject_prefix: String,

    /// Pause between two entries
    pub delay: Duration,

    /// Which page statuses count as content
    pub status_policy: StatusPolicy,
}

impl PipelineSettings {
    /// Resolves settings from a validated configuration
    ///
    /// The sender falls back to the SMTP username when no explicit `from` is
    /// configured.
    pub fn from_config(config: &Config) -> Self {
        let from = if config.delivery.from.trim().is_empty() {
            config.smtp.username.clone()
        } else {
            config.delivery.from.clone()
        };

        Self {
            recipient: config.delivery.recipient.clone(),
            from,
            mode: config.delivery.mode,
            subject_prefix: config.delivery.subject_prefix.clone(),
            delay: Duration::from_millis(config.pipeline.delay_ms),
            status_policy: StatusPolicy::reject_from(config.pipeline.reject_status),
        }
    }
}

/// Main pipeline structure
///
/// Processes one entry at a time. Nothing is shared between entries: each
/// page and message is dropped before the next entry starts.
pub struct Pipeline<M, D = TokioDelay> {
    client: Client,
    mailer: M,
    delay: D,
    settings: PipelineSettings,
    composer: Composer,
    titles: TitleExtractor,
    state: RunState,
}

impl<M: Mailer> Pipeline<M, TokioDelay> {
    /// Creates a pipeline from configuration with the wall-clock delay
    ///
    /// The configuration is validated first, so a missing recipient or SMTP
    /// credential fails here rather than on the first send.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sage::config::load_config;
    /// use sage::mail::SmtpMailer;
    /// use sage::Pipeline;
    /// use std::path::Path;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("sage.toml"))?;
    /// let mailer = SmtpMailer::new(&config.smtp)?;
    /// let mut pipeline = Pipeline::from_config(&config, mailer)?;
    /// let outcomes = pipeline.run(&config.sitemap.url).await?;
    /// println!("{} entries processed", outcomes.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &Config, mailer: M) -> Result<Self> {
        validate(config)?;
        let client = build_http_client()?;
        let settings = PipelineSettings::from_config(config);

        Ok(Self::new(client, mailer, TokioDelay, settings)
            .with_titles(TitleExtractor::from_sources(&config.pipeline.title_sources)))
    }
}

impl<M: Mailer, D: Delay> Pipeline<M, D> {
    /// Creates a pipeline with the default `twitter:title` extractor
    pub fn new(client: Client, mailer: M, delay: D, settings: PipelineSettings) -> Self {
        let composer = Composer::new(settings.from.clone());

        Self {
            client,
            mailer,
            delay,
            settings,
            composer,
            titles: TitleExtractor::default(),
            state: RunState::Init,
        }
    }

    /// Replaces the title extractor
    pub fn with_titles(mut self, titles: TitleExtractor) -> Self {
        self.titles = titles;
        self
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the pipeline over a sitemap
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<DeliveryOutcome>)` - One outcome per entry, in sitemap order
    /// * `Err(SageError)` - The sitemap could not be fetched or parsed; no
    ///   entry was attempted
    pub async fn run(&mut self, sitemap_url: &str) -> Result<Vec<DeliveryOutcome>> {
        self.transition(RunState::FetchingSitemap);

        let entries = match fetch_sitemap(&self.client, sitemap_url).await {
            Ok(entries) => entries,
            Err(e) => {
                self.transition(RunState::Aborted);
                tracing::error!("Aborting run: {}", e);
                return Err(e.into());
            }
        };

        Ok(self.process_entries(&entries).await)
    }

    async fn process_entries(&mut self, entries: &[SitemapEntry]) -> Vec<DeliveryOutcome> {
        let start_time = Instant::now();
        let mut outcomes = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            if index > 0 {
                self.transition(RunState::Delaying);
                self.delay.wait(self.settings.delay).await;
            }

            tracing::debug!("Processing entry {}/{}: {}", index + 1, entries.len(), entry.location);

            let outcome = self.process_entry(entry).await;
            match &outcome.status {
                OutcomeStatus::Delivered => {
                    tracing::info!(
                        "Delivered {} ({})",
                        entry.location,
                        outcome.subject.as_deref().unwrap_or_default()
                    );
                }
                OutcomeStatus::Failed(error) => {
                    tracing::error!(
                        "Failed to deliver {} at {} stage: {}",
                        entry.location,
                        error.stage(),
                        error
                    );
                }
            }
            outcomes.push(outcome);
        }

        self.transition(RunState::Done);

        let delivered = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!(
            "Run finished: {} delivered, {} failed in {:?}",
            delivered,
            outcomes.len() - delivered,
            start_time.elapsed()
        );

        outcomes
    }

    /// Processes a single entry
    ///
    /// Never fails: page and send errors become a failed outcome, title
    /// errors fall back to the entry URL as subject.
    async fn process_entry(&mut self, entry: &SitemapEntry) -> DeliveryOutcome {
        let url = entry.location.as_str();

        self.transition(RunState::FetchingPage);
        let page = match fetch_page(&self.client, url, self.settings.status_policy).await {
            Ok(page) => page,
            Err(e) => return DeliveryOutcome::failed(entry.clone(), None, e.into()),
        };

        self.transition(RunState::ExtractingTitle);
        let title = self.titles.extract(&page.body).unwrap_or_else(|e| {
            tracing::warn!("Title extraction failed for {}: {}", url, e);
            String::new()
        });
        if title.is_empty() {
            tracing::debug!("No title found for {}, using URL as subject", url);
        }
        let subject = build_subject(&self.settings.subject_prefix, &title, url);

        self.transition(RunState::ComposingSend);
        let message = self.compose(&subject, page);

        match self.mailer.send(message).await {
            Ok(()) => DeliveryOutcome::delivered(entry.clone(), subject),
            Err(e) => DeliveryOutcome::failed(entry.clone(), Some(subject), e.into()),
        }
    }

    fn compose(&self, subject: &str, page: PageContent) -> EmailMessage {
        match self.settings.mode {
            DeliveryMode::Body => {
                self.composer
                    .compose(&self.settings.recipient, subject, &page.body, None)
            }
            DeliveryMode::Attachment => {
                let attachment = Attachment::html(attachment_filename(&page.url), page.body);
                self.composer.compose(
                    &self.settings.recipient,
                    subject,
                    &link_body(&page.url),
                    Some(attachment),
                )
            }
        }
    }

    fn transition(&mut self, next: RunState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!("Unexpected run state transition {} -> {}", self.state, next);
        }
        tracing::trace!("Run state {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Builds the subject line for a page
///
/// Uses the title with its whitespace collapsed, or the page URL when the
/// title is empty.
pub fn build_subject(prefix: &str, title: &str, fallback_url: &str) -> String {
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let base = if title.is_empty() {
        fallback_url.trim()
    } else {
        title.as_str()
    };

    let prefix = prefix.trim();
    if prefix.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", prefix, base)
    }
}

/// Derives an `.html` file name for an attached page
///
/// The last non-empty path segment is used, or the host for root URLs.
pub fn attachment_filename(url: &str) -> String {
    let stem = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
                .or_else(|| parsed.host_str().map(str::to_string))
        })
        .unwrap_or_default();

    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let stem = stem.trim_end_matches(".html").trim_end_matches(".htm");
    let stem = stem.trim_matches(|c| c == '.' || c == '-');

    if stem.is_empty() {
        "page.html".to_string()
    } else {
        format!("{}.html", stem)
    }
}

/// Short HTML body pointing at the original page
fn link_body(url: &str) -> String {
    let escaped = url
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    format!(r#"<p><a href="{0}">{0}</a></p>"#, escaped)
}

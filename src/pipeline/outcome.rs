//! Per-entry delivery results

use crate::crawler::PageError;
use crate::mail::DeliveryError;
use crate::sitemap::SitemapEntry;
use std::fmt;
use thiserror::Error;

/// Why a single entry was not delivered
#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl EntryError {
    /// The pipeline stage that failed
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::Page(_) => FailureStage::Page,
            Self::Delivery(_) => FailureStage::Delivery,
        }
    }
}

/// Pipeline stage an entry failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureStage {
    /// Page fetch (transport, upstream status, body read)
    Page,

    /// Compose or send
    Delivery,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Delivery => "delivery",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Success or failure of one entry
#[derive(Debug)]
pub enum OutcomeStatus {
    Delivered,
    Failed(EntryError),
}

/// The result of attempting to mail one sitemap entry
///
/// A run produces exactly one outcome per entry, in sitemap order.
#[derive(Debug)]
pub struct DeliveryOutcome {
    /// The entry this outcome belongs to
    pub entry: SitemapEntry,

    /// Subject line used, if a send was attempted
    pub subject: Option<String>,

    pub status: OutcomeStatus,
}

impl DeliveryOutcome {
    pub fn delivered(entry: SitemapEntry, subject: String) -> Self {
        Self {
            entry,
            subject: Some(subject),
            status: OutcomeStatus::Delivered,
        }
    }

    pub fn failed(entry: SitemapEntry, subject: Option<String>, error: EntryError) -> Self {
        Self {
            entry,
            subject,
            status: OutcomeStatus::Failed(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Delivered)
    }

    /// The error, for failed outcomes
    pub fn error(&self) -> Option<&EntryError> {
        match &self.status {
            OutcomeStatus::Delivered => None,
            OutcomeStatus::Failed(error) => Some(error),
        }
    }

    /// The location of the entry
    pub fn url(&self) -> &str {
        &self.entry.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivered_outcome() {
        let outcome =
            DeliveryOutcome::delivered(SitemapEntry::new("https://x.test/1"), "Hello".to_string());
        assert!(outcome.is_success());
        assert!(outcome.error().is_none());
        assert_eq!(outcome.subject.as_deref(), Some("Hello"));
        assert_eq!(outcome.url(), "https://x.test/1");
    }

    #[test]
    fn test_failed_outcome_stage() {
        let error = EntryError::from(PageError::Upstream {
            url: "https://x.test/2".to_string(),
            status: 503,
        });
        let outcome = DeliveryOutcome::failed(SitemapEntry::new("https://x.test/2"), None, error);

        assert!(!outcome.is_success());
        let error = outcome.error().unwrap();
        assert_eq!(error.stage(), FailureStage::Page);
        assert!(error.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_delivery_stage() {
        let error = EntryError::from(DeliveryError::Build("boom".to_string()));
        assert_eq!(error.stage(), FailureStage::Delivery);
        assert_eq!(format!("{}", error.stage()), "delivery");
    }
}

/// Run state definitions for tracking pipeline progress
///
/// This module defines every state a pipeline run moves through and which
/// moves between them are legal.
use std::fmt;

/// Represents the current state of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Setup =====
    /// Pipeline built, nothing fetched yet
    Init,

    /// Retrieving and parsing the sitemap
    FetchingSitemap,

    // ===== Per-entry states =====
    /// Retrieving the current entry's page
    FetchingPage,

    /// Pulling a title out of the page
    ExtractingTitle,

    /// Building and sending the email
    ComposingSend,

    /// Waiting out the inter-request delay
    Delaying,

    // ===== Terminal States =====
    /// Every entry produced an outcome
    Done,

    /// The sitemap could not be loaded; no entries were processed
    Aborted,
}

impl RunState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if the run may move from this state to `next`
    ///
    /// A failed page fetch skips straight to `Delaying` (or to the next
    /// entry's `FetchingPage`, or `Done`, when it was the last entry).
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;

        matches!(
            (self, next),
            (Init, FetchingSitemap)
                | (FetchingSitemap, FetchingPage)
                | (FetchingSitemap, Done)
                | (FetchingSitemap, Aborted)
                | (FetchingPage, ExtractingTitle)
                | (FetchingPage, Delaying)
                | (FetchingPage, FetchingPage)
                | (FetchingPage, Done)
                | (ExtractingTitle, ComposingSend)
                | (ComposingSend, Delaying)
                | (ComposingSend, FetchingPage)
                | (ComposingSend, Done)
                | (Delaying, FetchingPage)
        )
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::FetchingSitemap => "fetching_sitemap",
            Self::FetchingPage => "fetching_page",
            Self::ExtractingTitle => "extracting_title",
            Self::ComposingSend => "composing_send",
            Self::Delaying => "delaying",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns all possible run states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Init,
            Self::FetchingSitemap,
            Self::FetchingPage,
            Self::ExtractingTitle,
            Self::ComposingSend,
            Self::Delaying,
            Self::Done,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

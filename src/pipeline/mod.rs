//! Crawl-extract-deliver pipeline
//!
//! Drives a run from sitemap URL to one [`DeliveryOutcome`] per entry:
//! - Sitemap fetch failures abort the run
//! - Page and send failures are recorded and the run moves on
//! - Title failures fall back to the page URL as subject
//! - A fixed delay separates consecutive entries

mod delay;
mod driver;
mod outcome;

pub use delay::{Delay, TokioDelay, DEFAULT_DELAY};
pub use driver::{attachment_filename, build_subject, Pipeline, PipelineSettings};
pub use outcome::{DeliveryOutcome, EntryError, FailureStage, OutcomeStatus};

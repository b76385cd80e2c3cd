//! Statistics over a run's delivery outcomes
//!
//! This module summarizes the outcome list returned by the pipeline and
//! prints it for the operator.

use crate::pipeline::{DeliveryOutcome, FailureStage};
use std::collections::BTreeMap;

/// Run statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Number of entries processed
    pub total: usize,

    /// Entries that were mailed
    pub delivered: usize,

    /// Failed entries per stage
    pub failures_by_stage: BTreeMap<FailureStage, usize>,

    /// URLs of failed entries, in sitemap order
    pub failed_urls: Vec<String>,
}

impl RunStatistics {
    /// Total number of failed entries
    pub fn failed(&self) -> usize {
        self.total - self.delivered
    }

    /// True when every entry was delivered
    pub fn all_delivered(&self) -> bool {
        self.delivered == self.total
    }
}

/// Computes statistics from the outcomes of a run
pub fn collect_statistics(outcomes: &[DeliveryOutcome]) -> RunStatistics {
    let mut stats = RunStatistics {
        total: outcomes.len(),
        ..Default::default()
    };

    for outcome in outcomes {
        match outcome.error() {
            None => stats.delivered += 1,
            Some(error) => {
                *stats.failures_by_stage.entry(error.stage()).or_insert(0) += 1;
                stats.failed_urls.push(outcome.url().to_string());
            }
        }
    }

    stats
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Sage Run Statistics ===\n");

    println!("Entries:   {}", stats.total);
    println!("Delivered: {}", stats.delivered);
    println!("Failed:    {}", stats.failed());

    if !stats.failures_by_stage.is_empty() {
        println!("\nFailures by stage:");
        for (stage, count) in &stats.failures_by_stage {
            println!("  {}: {}", stage, count);
        }
    }

    if !stats.failed_urls.is_empty() {
        println!("\nFailed URLs:");
        for url in &stats.failed_urls {
            println!("  - {}", url);
        }
    }
}

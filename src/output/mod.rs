//! Output module for run reports
//!
//! This module turns the outcome list of a run into something an operator can
//! read, and decides whether the run counts as a failure for the exit code.

pub mod stats;

pub use stats::{collect_statistics, print_statistics, RunStatistics};

use crate::sitemap::SitemapEntry;

/// Prints sitemap entries one per line: location, lastmod, changefreq, priority
///
/// Missing fields are printed as `-`.
pub fn print_entries(entries: &[SitemapEntry]) {
    println!("{}", "-".repeat(32));
    for entry in entries {
        println!("{}", format_entry(entry));
    }
    println!("{}", "-".repeat(32));
    println!("{} entries", entries.len());
}

fn format_entry(entry: &SitemapEntry) -> String {
    let last_modified = entry
        .last_modified
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    let change_frequency = entry.change_frequency.as_deref().unwrap_or("-");
    let priority = entry
        .priority
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} {} {}",
        entry.location, last_modified, change_frequency, priority
    )
}

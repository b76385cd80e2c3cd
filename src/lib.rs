//! Sage: sitemap to inbox
//!
//! This crate fetches a sitemap, downloads every page it lists, pulls a title out
//! of each page and mails the page to a fixed recipient, one page at a time with
//! a polite pause between requests.

pub mod config;
pub mod crawler;
pub mod mail;
pub mod output;
pub mod pipeline;
pub mod sitemap;
pub mod state;

use thiserror::Error;

/// Main error type for Sage operations
#[derive(Debug, Error)]
pub enum SageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] sitemap::SitemapError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sage operations
pub type Result<T> = std::result::Result<T, SageError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{DeliveryOutcome, Pipeline};
pub use sitemap::{fetch_sitemap, SitemapEntry};
pub use state::RunState;

//! Configuration module for Sage
//!
//! Settings come from an optional TOML file, then an environment overlay for
//! anything left empty. The result is validated once at startup and handed to
//! the pipeline as a plain value; nothing downstream reads the environment.
//!
//! # Example
//!
//! ```no_run
//! use sage::config::{apply_env, load_config, validate};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("sage.toml")).unwrap();
//! apply_env(&mut config, |key| std::env::var(key).ok()).unwrap();
//! validate(&config).unwrap();
//! println!("Mailing {} to {}", config.sitemap.url, config.delivery.recipient);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DeliveryConfig, DeliveryMode, PipelineConfig, SitemapConfig, SmtpConfig, TitleSource,
    TlsMode,
};

// Re-export parser functions
pub use parser::{apply_env, compute_config_hash, load_config, load_config_with_hash};

// Re-export validation entry points
pub use validation::{validate, validate_for_delivery, validate_for_fetch};

//! Email module
//!
//! Builds one message per page and hands it to a [`Mailer`]. The SMTP mailer
//! is the production transport; the pipeline only sees the trait, so any
//! other transport (or a test double) can stand in.

mod mailer;
mod message;

pub use mailer::{Mailer, SmtpMailer};
pub use message::{Attachment, Composer, EmailMessage};

use thiserror::Error;

/// Errors from the send stage. Each one only affects its own entry.
///
/// The pipeline treats all variants the same; they are kept apart so the log
/// line says what actually went wrong.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid {field} address '{value}': {message}")]
    Address {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Failed to read attachment {path}: {source}")]
    Attachment {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to set up mail transport: {0}")]
    Transport(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

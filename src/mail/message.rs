//! Outgoing email composition

use crate::mail::DeliveryError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use std::path::Path;

/// A file carried by an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    /// An HTML document attachment
    pub fn html(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "text/html; charset=utf-8".to_string(),
            content: content.into(),
        }
    }

    /// Reads a file from disk as an attachment
    ///
    /// The content type is guessed from the extension; unknown extensions are
    /// sent as `application/octet-stream`.
    pub async fn from_path(path: &Path) -> Result<Self, DeliveryError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| DeliveryError::Attachment {
                path: path.display().to_string(),
                source,
            })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        let content_type = match path.extension().and_then(|ext| ext.to_str()) {
            Some("html") | Some("htm") => "text/html; charset=utf-8",
            Some("txt") => "text/plain; charset=utf-8",
            _ => "application/octet-stream",
        }
        .to_string();

        Ok(Self {
            filename,
            content_type,
            content,
        })
    }
}

/// One email, built fresh for every delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<Attachment>,
}

impl EmailMessage {
    /// Builds the MIME message
    ///
    /// Without an attachment the message is a single `text/html` part. With
    /// one it is `multipart/mixed`: the HTML body, then the file.
    pub fn to_lettre(&self) -> Result<Message, DeliveryError> {
        let from = parse_mailbox("from", &self.from)?;
        let to = parse_mailbox("to", &self.to)?;

        let builder = Message::builder().from(from).to(to).subject(self.subject.as_str());

        let message = match &self.attachment {
            None => builder
                .header(ContentType::TEXT_HTML)
                .body(self.html_body.clone()),
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                    DeliveryError::Build(format!(
                        "invalid content type '{}': {}",
                        attachment.content_type, e
                    ))
                })?;

                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::html(self.html_body.clone()))
                        .singlepart(
                            MimeAttachment::new(attachment.filename.clone())
                                .body(attachment.content.clone(), content_type),
                        ),
                )
            }
        };

        message.map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, DeliveryError> {
    value
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::Address {
            field,
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Builds messages with a fixed sender
#[derive(Debug, Clone)]
pub struct Composer {
    from: String,
}

impl Composer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }

    /// Composes a message for one delivery
    pub fn compose(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachment: Option<Attachment>,
    ) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachment,
        }
    }

    /// Composes a message attaching a file from disk
    pub async fn compose_with_file(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        path: &Path,
    ) -> Result<EmailMessage, DeliveryError> {
        let attachment = Attachment::from_path(path).await?;
        Ok(self.compose(to, subject, html_body, Some(attachment)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn composer() -> Composer {
        Composer::new("Sage <sage@example.com>")
    }

    #[test]
    fn test_compose_body_message() {
        let message = composer().compose("reader@example.com", "Hello", "<h1>Hi</h1>", None);

        assert_eq!(message.from, "Sage <sage@example.com>");
        assert_eq!(message.to, "reader@example.com");
        assert_eq!(message.subject, "Hello");
        assert!(message.attachment.is_none());

        let formatted = String::from_utf8(message.to_lettre().unwrap().formatted()).unwrap();
        assert!(formatted.contains("Subject: Hello"));
        assert!(formatted.contains("text/html"));
        assert!(formatted.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_compose_attachment_message() {
        let attachment = Attachment::html("post.html", "<p>page</p>");
        let message = composer().compose(
            "reader@example.com",
            "With file",
            "<p>see attached</p>",
            Some(attachment),
        );

        let formatted = String::from_utf8(message.to_lettre().unwrap().formatted()).unwrap();
        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("attachment"));
        assert!(formatted.contains("post.html"));
    }

    #[test]
    fn test_invalid_recipient_is_delivery_error() {
        let message = composer().compose("not an address", "Hello", "<p></p>", None);
        match message.to_lettre() {
            Err(DeliveryError::Address { field, .. }) => assert_eq!(field, "to"),
            other => panic!("expected address error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_sender_is_delivery_error() {
        let message = Composer::new("").compose("reader@example.com", "Hello", "<p></p>", None);
        assert!(matches!(
            message.to_lettre(),
            Err(DeliveryError::Address { field: "from", .. })
        ));
    }

    #[tokio::test]
    async fn test_attachment_from_path() {
        let mut file = Builder::new().suffix(".html").tempfile().unwrap();
        file.write_all(b"<html>saved</html>").unwrap();
        file.flush().unwrap();

        let message = composer()
            .compose_with_file("reader@example.com", "Saved", "<p>see attached</p>", file.path())
            .await
            .unwrap();

        let attachment = message.attachment.unwrap();
        assert_eq!(attachment.content, b"<html>saved</html>");
        assert_eq!(attachment.content_type, "text/html; charset=utf-8");
        assert!(attachment.filename.ends_with(".html"));
    }

    #[tokio::test]
    async fn test_missing_attachment_file() {
        let result = Attachment::from_path(Path::new("/nonexistent/page.html")).await;
        assert!(matches!(result, Err(DeliveryError::Attachment { .. })));
    }
}

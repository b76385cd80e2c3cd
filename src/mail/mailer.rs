//! Mail transports

use crate::config::{SmtpConfig, TlsMode};
use crate::mail::{DeliveryError, EmailMessage};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

/// Something that can deliver an [`EmailMessage`]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers one message. No retry.
    async fn send(&self, message: EmailMessage) -> Result<(), DeliveryError>;
}

/// Authenticated SMTP delivery through lettre
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    /// Creates a mailer for the configured relay
    ///
    /// No connection is opened here; the first `send` connects and
    /// authenticates.
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let builder = match config.tls {
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?,
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let transport = builder.port(config.port).credentials(credentials).build();

        Ok(Self {
            transport,
            host: format!("{}:{}", config.host, config.port),
        })
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("host", &self.host).finish()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), DeliveryError> {
        let email = message.to_lettre()?;

        self.transport.send(email).await?;

        tracing::debug!(
            relay = %self.host,
            to = %message.to,
            subject = %message.subject,
            "SMTP relay accepted message"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_config(tls: TlsMode) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 2525,
            username: "sage@example.com".to_string(),
            password: "secret".to_string(),
            tls,
        }
    }

    #[test]
    fn test_build_mailer_for_each_tls_mode() {
        for tls in [TlsMode::StartTls, TlsMode::Tls, TlsMode::None] {
            let mailer = SmtpMailer::new(&smtp_config(tls));
            assert!(mailer.is_ok(), "failed to build mailer for {:?}", tls);
        }
    }

    #[test]
    fn test_debug_hides_credentials() {
        let mailer = SmtpMailer::new(&smtp_config(TlsMode::None)).unwrap();
        let debug = format!("{:?}", mailer);
        assert!(debug.contains("smtp.example.com:2525"));
        assert!(!debug.contains("secret"));
    }

    #[tokio::test]
    async fn test_invalid_message_fails_before_connecting() {
        let mailer = SmtpMailer::new(&smtp_config(TlsMode::None)).unwrap();
        let message = EmailMessage {
            from: "sage@example.com".to_string(),
            to: "nobody".to_string(),
            subject: "Hello".to_string(),
            html_body: "<p></p>".to_string(),
            attachment: None,
        };

        assert!(matches!(
            mailer.send(message).await,
            Err(DeliveryError::Address { .. })
        ));
    }
}

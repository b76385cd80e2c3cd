use crate::config::types::{Config, DeliveryConfig, PipelineConfig, SmtpConfig};
use crate::{ConfigError, ConfigResult};
use lettre::message::Mailbox;
use url::Url;

/// Validates everything a full `send` run needs
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_for_fetch(config)?;
    validate_for_delivery(config)?;
    Ok(())
}

/// Validates the settings needed to fetch and walk the sitemap
pub fn validate_for_fetch(config: &Config) -> ConfigResult<()> {
    validate_sitemap_url(&config.sitemap.url)?;
    validate_pipeline_config(&config.pipeline)?;
    Ok(())
}

/// Validates the settings needed to send mail
pub fn validate_for_delivery(config: &Config) -> ConfigResult<()> {
    validate_delivery_config(&config.delivery)?;
    validate_smtp_config(&config.smtp)?;

    // The SMTP username doubles as the sender when no `from` is set
    if config.delivery.from.trim().is_empty() {
        validate_mailbox("sender (smtp username)", &config.smtp.username)?;
    }

    Ok(())
}

fn validate_sitemap_url(url: &str) -> ConfigResult<()> {
    if url.trim().is_empty() {
        return Err(ConfigError::Missing("sitemap url".to_string()));
    }

    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sitemap url '{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Sitemap url '{}' must use http or https",
            url
        )));
    }

    Ok(())
}

fn validate_pipeline_config(config: &PipelineConfig) -> ConfigResult<()> {
    if !(100..=599).contains(&config.reject_status) {
        return Err(ConfigError::Validation(format!(
            "reject-status must be between 100 and 599, got {}",
            config.reject_status
        )));
    }

    if config.title_sources.is_empty() {
        return Err(ConfigError::Validation(
            "title-sources must name at least one source".to_string(),
        ));
    }

    Ok(())
}

fn validate_delivery_config(config: &DeliveryConfig) -> ConfigResult<()> {
    if config.recipient.trim().is_empty() {
        return Err(ConfigError::Missing(
            "recipient (set delivery.recipient, --recipient or RECIPIENT)".to_string(),
        ));
    }

    validate_mailbox("recipient", &config.recipient)?;

    if !config.from.trim().is_empty() {
        validate_mailbox("sender", &config.from)?;
    }

    Ok(())
}

fn validate_smtp_config(config: &SmtpConfig) -> ConfigResult<()> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Missing("smtp host".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation("smtp port cannot be 0".to_string()));
    }

    if config.username.trim().is_empty() {
        return Err(ConfigError::Missing(
            "smtp username (set smtp.username or EMAIL_ADDRESS)".to_string(),
        ));
    }

    if config.password.is_empty() {
        return Err(ConfigError::Missing(
            "smtp password (set smtp.password or EMAIL_PASSWORD)".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a value is a mailbox the mail layer can send to or from
///
/// Accepts a bare address or the `Display Name <address>` form.
fn validate_mailbox(field: &str, value: &str) -> ConfigResult<()> {
    value.trim().parse::<Mailbox>().map(|_| ()).map_err(|e| {
        ConfigError::Validation(format!("Invalid {} address '{}': {}", field, value, e))
    })
}

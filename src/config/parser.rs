use crate::config::types::Config;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Validation is not performed here because each command needs a different
/// subset of settings; see [`validate_for_fetch`](super::validate_for_fetch)
/// and friends.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sage::config::load_config;
///
/// let config = load_config(Path::new("sage.toml")).unwrap();
/// println!("Sitemap: {}", config.sitemap.url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be told apart by their settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Fills empty settings from environment-style variables
///
/// Values already present in `config` always win. `lookup` is usually
/// `|key| std::env::var(key).ok()`; tests pass a map instead.
///
/// | Variable | Setting |
/// |----------|---------|
/// | `SITEMAP_URL` | `sitemap.url` |
/// | `RECIPIENT` | `delivery.recipient` |
/// | `EMAIL_FROM` | `delivery.from` |
/// | `SMTP_HOST`, `EMAIL_HOST` | `smtp.host` |
/// | `SMTP_PORT`, `EMAIL_PORT` | `smtp.port` |
/// | `EMAIL_ADDRESS` | `smtp.username` |
/// | `EMAIL_PASSWORD` | `smtp.password` |
///
/// The SMTP host and port always carry a default, so their variables replace
/// the default rather than an empty value.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |keys: &[&str]| {
        keys.iter()
            .filter_map(|key| lookup(*key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    };

    fill(&mut config.sitemap.url, get(&["SITEMAP_URL"]));
    fill(&mut config.delivery.recipient, get(&["RECIPIENT"]));
    fill(&mut config.delivery.from, get(&["EMAIL_FROM"]));
    fill(&mut config.smtp.username, get(&["EMAIL_ADDRESS"]));
    fill(&mut config.smtp.password, get(&["EMAIL_PASSWORD"]));

    if let Some(host) = get(&["SMTP_HOST", "EMAIL_HOST"]) {
        config.smtp.host = host;
    }

    if let Some(port) = get(&["SMTP_PORT", "EMAIL_PORT"]) {
        config.smtp.port = port.parse().map_err(|_| {
            ConfigError::Validation(format!("SMTP port must be a number, got '{}'", port))
        })?;
    }

    Ok(())
}

fn fill(slot: &mut String, value: Option<String>) {
    if slot.trim().is_empty() {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

//! Sage main entry point
//!
//! This is the command-line interface for the Sage sitemap mailer.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sage::config::{
    apply_env, load_config_with_hash, validate, validate_for_delivery, validate_for_fetch, Config,
    DeliveryMode,
};
use sage::crawler::{build_http_client, extract_title, fetch_page, StatusPolicy};
use sage::mail::{Attachment, Composer, Mailer, SmtpMailer};
use sage::output::{collect_statistics, print_entries, print_statistics};
use sage::pipeline::{attachment_filename, build_subject, Pipeline, PipelineSettings};
use sage::sitemap::fetch_sitemap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_PATH: &str = "sage.toml";

/// Sage: crawl a sitemap and bulk email its pages
///
/// Sage fetches a sitemap, downloads every page it lists one at a time, and
/// mails each page to a single recipient with the page title as subject.
#[derive(Parser, Debug)]
#[command(name = "sage")]
#[command(version)]
#[command(about = "Crawls a sitemap and mails every page to a fixed inbox", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults to ./sage.toml if present)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sage version
    Version,

    /// Fetch a sitemap and list its entries
    Fetch {
        /// The sitemap to fetch urls from
        #[arg(short, long, value_name = "URL")]
        sitemap: Option<String>,
    },

    /// Fetch a sitemap and mail every page to the recipient
    Send {
        /// The sitemap to fetch urls from
        #[arg(short, long, value_name = "URL")]
        sitemap: Option<String>,

        /// The email address to send content to
        #[arg(short, long, value_name = "ADDRESS")]
        recipient: Option<String>,

        /// Attach each page as an HTML file instead of using it as the body
        #[arg(long)]
        attach: bool,

        /// Exit non-zero if any entry failed
        #[arg(long)]
        strict: bool,
    },

    /// Mail one page as an attachment to check that SMTP auth works
    TestSend {
        /// Page to fetch and attach
        #[arg(long, value_name = "URL", default_value = "https://text.npr.org/")]
        url: String,

        /// Attach this file instead of fetching a page
        #[arg(long, value_name = "PATH", conflicts_with = "url")]
        file: Option<PathBuf>,

        /// The email address to send the test to
        #[arg(short, long, value_name = "ADDRESS")]
        recipient: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if matches!(cli.command, Command::Version) {
        println!("sage version v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Version => Ok(()),
        Command::Fetch { sitemap } => {
            override_value(&mut config.sitemap.url, sitemap);
            validate_for_fetch(&config)?;
            handle_fetch(&config).await
        }
        Command::Send {
            sitemap,
            recipient,
            attach,
            strict,
        } => {
            override_value(&mut config.sitemap.url, sitemap);
            override_value(&mut config.delivery.recipient, recipient);
            if attach {
                config.delivery.mode = DeliveryMode::Attachment;
            }
            validate(&config)?;
            handle_send(&config, strict).await
        }
        Command::TestSend {
            url,
            file,
            recipient,
        } => {
            override_value(&mut config.delivery.recipient, recipient);
            validate_for_delivery(&config)?;
            handle_test_send(&config, &url, file.as_deref()).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sage=info,warn"),
            1 => EnvFilter::new("sage=debug,info"),
            2 => EnvFilter::new("sage=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the configuration: `.env`, then config file, then environment overlay
fn load_settings(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    let path = match path {
        Some(path) => Some(path),
        None if default_path.exists() => Some(default_path),
        None => None,
    };

    let mut config = match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file, using defaults and environment");
            Config::default()
        }
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn override_value(slot: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *slot = value;
    }
}

/// Handles `fetch`: prints the sitemap entries without sending anything
async fn handle_fetch(config: &Config) -> anyhow::Result<()> {
    let client = build_http_client()?;
    let entries = fetch_sitemap(&client, &config.sitemap.url).await?;

    println!("{}", config.sitemap.url);
    print_entries(&entries);

    Ok(())
}

/// Handles `send`: the full pipeline
async fn handle_send(config: &Config, strict: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Mailing pages of {} to {} ({:?} mode, {} ms between pages)",
        config.sitemap.url,
        config.delivery.recipient,
        config.delivery.mode,
        config.pipeline.delay_ms
    );

    let mailer = SmtpMailer::new(&config.smtp)?;
    let mut pipeline = Pipeline::from_config(config, mailer)?;

    let outcomes = match pipeline.run(&config.sitemap.url).await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
            return Err(e.into());
        }
    };

    let stats = collect_statistics(&outcomes);
    print_statistics(&stats);

    if strict && !stats.all_delivered() {
        bail!("{} of {} entries failed", stats.failed(), stats.total);
    }

    Ok(())
}

/// Handles `test-send`: one page (or file) as an attachment
async fn handle_test_send(config: &Config, url: &str, file: Option<&Path>) -> anyhow::Result<()> {
    let settings = PipelineSettings::from_config(config);
    let composer = Composer::new(settings.from.clone());
    let body = "<h1>sage test email</h1><p>If you can read this, SMTP delivery works.</p>";

    let message = match file {
        Some(path) => {
            composer
                .compose_with_file(&settings.recipient, "sage test email", body, path)
                .await?
        }
        None => {
            let client = build_http_client()?;
            let page = fetch_page(&client, url, StatusPolicy::default()).await?;
            tracing::info!("Fetched {} ({} bytes)", url, page.byte_len());

            let title = extract_title(&page.body).unwrap_or_default();
            let subject = build_subject("sage test email:", &title, url);
            let attachment = Attachment::html(attachment_filename(url), page.body);
            composer.compose(&settings.recipient, &subject, body, Some(attachment))
        }
    };

    let mailer = SmtpMailer::new(&config.smtp)?;
    match mailer.send(message).await {
        Ok(()) => {
            tracing::info!("Test email sent to {}", settings.recipient);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Test email failed: {}", e);
            Err(e.into())
        }
    }
}

pub mod bucket;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod progress;
pub mod provision;
pub mod registry;
pub mod verbosity;

pub use error::ProvisionError;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

use crate::executor::CommandExecutor;
use crate::registry::SchemeRegistry;

pub fn init_logging(log_level: cli::LogLevel) -> Result<()> {
    let filter = match log_level {
        cli::LogLevel::Trace => LevelFilter::TRACE,
        cli::LogLevel::Debug => LevelFilter::DEBUG,
        cli::LogLevel::Info => LevelFilter::INFO,
        cli::LogLevel::Warn => LevelFilter::WARN,
        cli::LogLevel::Error => LevelFilter::ERROR,
    };

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(filter).finish(),
    )
    .context("failed to set global default tracing subscriber")
}

/// Builds the scheme registry from the configuration named in `common`.
fn load_registry(
    common: &cli::CommonArgs,
    executor: Arc<dyn CommandExecutor>,
) -> Result<SchemeRegistry> {
    let config = config::load_config_or_default(common.config.as_deref())
        .context("failed to load configuration")?;
    SchemeRegistry::from_config(&config, executor)
}

/// Runs the download subcommand. Returns whether the transfer completed.
pub fn run_download(opts: &cli::DownloadArgs, executor: Arc<dyn CommandExecutor>) -> Result<bool> {
    let registry = load_registry(&opts.common, executor)?;
    let done = registry
        .download_from(&opts.locator, &opts.destination)
        .with_context(|| format!("failed to download {}", opts.locator))?;
    if done {
        info!("downloaded {} to {}", opts.locator, opts.destination);
    }
    Ok(done)
}

/// Runs the upload subcommand. Returns whether the transfer completed.
pub fn run_upload(opts: &cli::UploadArgs, executor: Arc<dyn CommandExecutor>) -> Result<bool> {
    let registry = load_registry(&opts.common, executor)?;
    let done = registry
        .upload_to(&opts.locator, &opts.source, opts.metadata.as_deref())
        .with_context(|| format!("failed to upload {}", opts.source))?;
    if done {
        info!("uploaded {} to {}", opts.source, opts.locator);
    }
    Ok(done)
}

/// Returns the schemes the configured registry can handle.
pub fn run_schemes(
    opts: &cli::SchemesArgs,
    executor: Arc<dyn CommandExecutor>,
) -> Result<Vec<String>> {
    let registry = load_registry(&opts.common, executor)?;
    Ok(registry.schemes().into_iter().map(String::from).collect())
}

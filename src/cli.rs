use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a remote object to a local file
    Download(DownloadArgs),

    /// Upload a local file or directory to a remote location
    Upload(UploadArgs),

    /// List the locator schemes that can be handled
    Schemes(SchemesArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Options shared by every subcommand that touches a backend.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to the YAML file with per-scheme backend settings
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Set the log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Remote locator (e.g. s3cmd://bucket/dir/object)
    pub locator: String,

    /// Local destination file
    pub destination: Utf8PathBuf,

    /// Do not run, just show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Remote locator; a trailing slash denotes a directory
    pub locator: String,

    /// Local source file or directory
    pub source: Utf8PathBuf,

    /// Metadata passed to the backend
    #[arg(short, long)]
    pub metadata: Option<String>,

    /// Do not run, just show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct SchemesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Represents log levels for controlling the verbosity of logging output.
///
/// Maps directly to the `tracing` levels. Backend output echoed to the
/// diagnostic sink (e.g. `s3cmd info`) only shows up at `debug` or `trace`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

pub fn parse_args() -> Result<Cli> {
    Ok(Cli::parse())
}

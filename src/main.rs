use std::io;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::CommandFactory;
use tracing::error;

use fileprov::cli::{self, Commands};
use fileprov::executor::{CommandExecutor, RealCommandExecutor};

fn executor(dry_run: bool) -> Arc<dyn CommandExecutor> {
    Arc::new(RealCommandExecutor { dry_run })
}

fn main() -> Result<()> {
    let args = cli::parse_args()?;

    let log_level = match &args.command {
        Commands::Download(opts) => opts.common.log_level,
        Commands::Upload(opts) => opts.common.log_level,
        Commands::Schemes(opts) => opts.common.log_level,
        Commands::Completions(opts) => {
            let mut cmd = cli::Cli::command();
            clap_complete::generate(opts.shell, &mut cmd, env!("CARGO_PKG_NAME"), &mut io::stdout());
            return Ok(());
        }
    };
    fileprov::init_logging(log_level)?;

    let done = match &args.command {
        Commands::Download(opts) => fileprov::run_download(opts, executor(opts.dry_run))?,
        Commands::Upload(opts) => fileprov::run_upload(opts, executor(opts.dry_run))?,
        Commands::Schemes(opts) => {
            for scheme in fileprov::run_schemes(opts, executor(true))? {
                println!("{}", scheme);
            }
            true
        }
        Commands::Completions(_) => true,
    };

    if !done {
        error!("transfer did not complete");
        process::exit(1);
    }

    Ok(())
}

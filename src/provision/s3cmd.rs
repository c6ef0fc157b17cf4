//! s3cmd backend.
//!
//! Locators look like `s3cmd://bucket/dir/object` and are handed to s3cmd
//! as `s3://bucket/dir/object`. s3cmd writes progress to stderr, so its
//! output is merged into stdout to keep lines in order for the progress
//! display.

use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

use anyhow::Result;
use camino::Utf8Path;
use tracing::{debug, info};

use super::settings::home_path;
use super::{
    BackendDefaults, Capabilities, ClientCommand, Provisioner, ProvisionerSettings, strip_scheme,
};
use crate::bucket::BucketManager;
use crate::chunk::chunk_size_override;
use crate::config::ProvisionerConfig;
use crate::error::ProvisionError;
use crate::executor::{CommandExecutor, CommandSpec, EchoTarget, OutputMode};
use crate::outcome::ExitCodeTable;
use crate::verbosity::Verbosity;

/// Locator scheme handled by this backend.
pub const SCHEME: &str = "s3cmd";

const DEFAULT_CLIENT: &str = "/usr/bin/s3cmd";

/// Provisioner delegating transfers to s3cmd.
pub struct S3cmdProvisioner {
    settings: ProvisionerSettings,
    client: ClientCommand,
    executor: Arc<dyn CommandExecutor>,
}

impl S3cmdProvisioner {
    /// Defaults: `/usr/bin/s3cmd` and `~/.s3cfg`.
    pub fn defaults() -> BackendDefaults {
        BackendDefaults {
            client: DEFAULT_CLIENT.to_string(),
            config_file: home_path(".s3cfg"),
        }
    }

    /// Creates a provisioner from this backend's configuration map.
    pub fn new(config: &ProvisionerConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::from_settings(ProvisionerSettings::resolve(config, Self::defaults()), executor)
    }

    pub fn from_settings(settings: ProvisionerSettings, executor: Arc<dyn CommandExecutor>) -> Self {
        let client = ClientCommand::new(&settings, "-c", OutputMode::Merged);
        Self {
            settings,
            client,
            executor,
        }
    }

    pub fn settings(&self) -> &ProvisionerSettings {
        &self.settings
    }

    /// Echo target for transfer commands; `quiet` silences them.
    fn transfer_echo(&self) -> EchoTarget {
        if self.settings.verbosity >= Verbosity::Minimal {
            EchoTarget::Console
        } else {
            EchoTarget::Silent
        }
    }

    /// Echo target for bucket creation, shown from `normal` upwards.
    fn create_echo(&self) -> EchoTarget {
        if self.settings.verbosity >= Verbosity::Normal {
            EchoTarget::Console
        } else {
            EchoTarget::Diagnostic
        }
    }

    /// Rewrites `s3cmd://bucket/key` to `s3://bucket/key`.
    fn remote_path(locator: &str) -> Result<String, ProvisionError> {
        let path = strip_scheme(locator, SCHEME)?;
        Ok(format!("s3://{}", path))
    }

    /// Returns `s3://<bucket>` for the first segment of a rewritten path.
    fn bucket_of(remote: &str) -> Result<String, ProvisionError> {
        let trimmed = remote.trim_start_matches("s3://");
        match trimmed.split('/').next() {
            Some(bucket) if !bucket.is_empty() => Ok(format!("s3://{}", bucket)),
            _ => Err(ProvisionError::Validation(format!("no bucket name in '{}'", remote))),
        }
    }

    /// Builds the `get` command for a download.
    pub fn download_spec(&self, locator: &str, destination: &Utf8Path) -> Result<CommandSpec> {
        let remote = Self::remote_path(locator)?;
        let mut args = self.client.args();
        args.push_flag("get");
        args.push_arg(remote);
        args.push_arg(destination.as_str());
        args.push_flag("--force");
        // s3cmd leaves the progress line open after a download, not after an upload
        Ok(self
            .client
            .spec(args)
            .with_echo(self.transfer_echo())
            .with_trailing_newline(true))
    }

    /// Builds the `put` command for an upload of `size_in_bytes` bytes.
    pub fn upload_spec(
        &self,
        locator: &str,
        source: &Utf8Path,
        size_in_bytes: u64,
    ) -> Result<CommandSpec> {
        let remote = Self::remote_path(locator)?;
        let mut args = self.client.args();
        args.push_flag("put");
        // A trailing slash means a remote directory; `-r` is harmless for a single file
        args.push_flag_if("-r", remote.ends_with('/'));
        args.push_arg(source.as_str());
        args.push_arg(remote);
        args.push_opt_arg(chunk_size_override(size_in_bytes));
        Ok(self.client.spec(args).with_echo(self.transfer_echo()))
    }

    fn run(&self, spec: &CommandSpec) -> Result<bool> {
        let result = self.executor.execute(spec)?;
        let outcome = ExitCodeTable::S3CMD.classify(&result);
        Ok(outcome.into_result(&spec.to_string(), &result)?)
    }
}

impl Provisioner for S3cmdProvisioner {
    fn schemes_handled(&self) -> BTreeSet<String> {
        BTreeSet::from([SCHEME.to_string()])
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            download: true,
            upload: true,
        }
    }

    fn download_from(&self, locator: &str, destination: &Utf8Path) -> Result<bool> {
        info!("downloading {} to {}", locator, destination);
        let spec = self.download_spec(locator, destination)?;
        self.run(&spec)
    }

    fn upload_to(&self, locator: &str, source: &Utf8Path, metadata: Option<&str>) -> Result<bool> {
        info!("uploading {} to {}", source, locator);
        if let Some(metadata) = metadata {
            debug!("ignoring metadata for s3cmd upload: {}", metadata);
        }

        let size_in_bytes = fs::metadata(source)
            .map_err(|e| ProvisionError::io(format!("failed to read metadata: {}", source), e))?
            .len();
        let spec = self.upload_spec(locator, source, size_in_bytes)?;

        let bucket = Self::bucket_of(&Self::remote_path(locator)?)?;
        BucketManager::new(self.executor.as_ref(), &self.client, ExitCodeTable::S3CMD)
            .with_create_echo(self.create_echo())
            .ensure_bucket_exists(&bucket)?;

        self.run(&spec)
    }
}

//! icgc-get backend (download only).
//!
//! Locators look like `icgc-get://<object id>`; the object id is passed to
//! `icgc-get download` as-is.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use camino::Utf8Path;
use tracing::info;

use super::staging::{StagingDir, find_payload, move_into_place};
use super::{
    BackendDefaults, Capabilities, ClientCommand, Provisioner, ProvisionerSettings, strip_scheme,
};
use crate::config::ProvisionerConfig;
use crate::error::ProvisionError;
use crate::executor::{CommandExecutor, CommandSpec, EchoTarget, OutputMode};
use crate::outcome::ExitCodeTable;
use crate::verbosity::Verbosity;

/// Locator scheme handled by this backend.
pub const SCHEME: &str = "icgc-get";

const DEFAULT_CLIENT: &str = "/icgc-get/icgc-get";
const DEFAULT_CONFIG_FILE: &str = "/.icgc-get/config.yaml";

/// Provisioner delegating downloads to icgc-get.
pub struct IcgcGetProvisioner {
    settings: ProvisionerSettings,
    client: ClientCommand,
    executor: Arc<dyn CommandExecutor>,
}

impl IcgcGetProvisioner {
    /// Defaults: `/icgc-get/icgc-get` and `/.icgc-get/config.yaml`.
    pub fn defaults() -> BackendDefaults {
        BackendDefaults {
            client: DEFAULT_CLIENT.to_string(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
        }
    }

    /// Creates a provisioner from this backend's configuration map.
    pub fn new(config: &ProvisionerConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::from_settings(ProvisionerSettings::resolve(config, Self::defaults()), executor)
    }

    pub fn from_settings(settings: ProvisionerSettings, executor: Arc<dyn CommandExecutor>) -> Self {
        let client = ClientCommand::new(&settings, "--config", OutputMode::Separate);
        Self {
            settings,
            client,
            executor,
        }
    }

    pub fn settings(&self) -> &ProvisionerSettings {
        &self.settings
    }

    /// Extracts the object id from `icgc-get://<id>`.
    fn object_id(locator: &str) -> Result<&str, ProvisionError> {
        let id = strip_scheme(locator, SCHEME)?;
        if id.is_empty() {
            return Err(ProvisionError::Validation(format!("no object id in '{}'", locator)));
        }
        Ok(id)
    }

    /// Builds the `download` command writing into `output_dir`.
    pub fn download_spec(&self, object_id: &str, output_dir: &Utf8Path) -> CommandSpec {
        let mut args = self.client.args();
        args.push_flag("download");
        args.push_arg(object_id);
        args.push_flag_value("--output", output_dir.as_str());
        let echo = if self.settings.verbosity >= Verbosity::Minimal {
            EchoTarget::Console
        } else {
            EchoTarget::Silent
        };
        self.client.spec(args).with_echo(echo)
    }
}

impl Provisioner for IcgcGetProvisioner {
    fn schemes_handled(&self) -> BTreeSet<String> {
        BTreeSet::from([SCHEME.to_string()])
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            download: true,
            upload: false,
        }
    }

    fn download_from(&self, locator: &str, destination: &Utf8Path) -> Result<bool> {
        let object_id = Self::object_id(locator)?;
        info!("downloading {} to {}", object_id, destination);

        let parent = match destination.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let staging = StagingDir::create_in(parent, SCHEME)?;
        let spec = self.download_spec(object_id, staging.path());

        let result = self.executor.execute(&spec)?;
        let outcome = ExitCodeTable::ICGC_GET.classify(&result);
        if !outcome.into_result(&spec.to_string(), &result)? {
            return Ok(false);
        }
        if result.dry_run {
            info!("dry run: skipping relocation of {} to {}", object_id, destination);
            return Ok(true);
        }

        let payload = find_payload(staging.path())?.ok_or_else(|| {
            ProvisionError::Staging(format!(
                "icgc-get produced no payload file for {} in {}",
                object_id,
                staging.path()
            ))
        })?;
        tracing::debug!("found payload: {}", payload);
        move_into_place(&payload, destination)?;
        Ok(true)
    }

    fn upload_to(&self, locator: &str, _source: &Utf8Path, _metadata: Option<&str>) -> Result<bool> {
        tracing::error!("icgc-get does not support upload: {}", locator);
        Err(ProvisionError::unsupported(SCHEME, "upload").into())
    }
}

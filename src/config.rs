//! Loading of per-backend configuration from a YAML file.
//!
//! The file maps each scheme to that backend's key/value settings:
//!
//! ```yaml
//! s3cmd:
//!   client: /usr/local/bin/s3cmd
//!   config-file-location: /home/user/.s3cfg
//!   verbosity: minimal
//! icgc-get:
//!   client: /opt/icgc-get/icgc-get
//! ```

use std::collections::BTreeMap;
use std::fs;

use camino::Utf8Path;
use serde::Deserialize;

use crate::error::ProvisionError;

/// Key/value settings of a single backend.
pub type ProvisionerConfig = BTreeMap<String, String>;

/// Settings of every configured backend, keyed by scheme.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ProvisionConfig {
    backends: BTreeMap<String, ProvisionerConfig>,
}

impl ProvisionConfig {
    /// Returns the settings for `scheme`, empty if the scheme is not configured.
    pub fn backend(&self, scheme: &str) -> ProvisionerConfig {
        self.backends.get(scheme).cloned().unwrap_or_default()
    }

    /// Returns the configured schemes.
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    /// Parses configuration from YAML text. Blank text yields an empty config.
    pub fn from_yaml(text: &str) -> Result<Self, ProvisionError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|e| ProvisionError::Config(format!("failed to parse yaml: {}", e)))
    }
}

/// Loads configuration from `path`.
pub fn load_config(path: &Utf8Path) -> Result<ProvisionConfig, ProvisionError> {
    let text = fs::read_to_string(path).map_err(|e| ProvisionError::io(path.as_str(), e))?;
    let config = ProvisionConfig::from_yaml(&text).map_err(|e| match e {
        ProvisionError::Config(msg) => ProvisionError::Config(format!("{}: {}", path, msg)),
        other => other,
    })?;
    tracing::debug!("loaded configuration from {}: {:?}", path, config);
    Ok(config)
}

/// Loads configuration from `path`, or returns an empty one when no path is given.
pub fn load_config_or_default(path: Option<&Utf8Path>) -> Result<ProvisionConfig, ProvisionError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(ProvisionConfig::default()),
    }
}

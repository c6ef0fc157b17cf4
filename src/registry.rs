//! Scheme-to-provisioner dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use camino::Utf8Path;
use url::Url;

use crate::config::ProvisionConfig;
use crate::error::ProvisionError;
use crate::executor::CommandExecutor;
use crate::provision::{IcgcGetProvisioner, Provisioner, S3cmdProvisioner, icgc_get, s3cmd};

/// Registry of provisioners keyed by the schemes they declare.
#[derive(Default)]
pub struct SchemeRegistry {
    provisioners: BTreeMap<String, Arc<dyn Provisioner>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry holding every built-in backend, each configured
    /// from its own section of `config`.
    pub fn from_config(config: &ProvisionConfig, executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(S3cmdProvisioner::new(
            &config.backend(s3cmd::SCHEME),
            Arc::clone(&executor),
        )))?;
        registry.register(Arc::new(IcgcGetProvisioner::new(
            &config.backend(icgc_get::SCHEME),
            executor,
        )))?;

        for scheme in config.schemes() {
            if registry.get(scheme).is_none() {
                tracing::warn!("ignoring configuration for unknown scheme '{}'", scheme);
            }
        }
        Ok(registry)
    }

    /// Registers `provisioner` under every scheme it handles.
    ///
    /// Fails if one of its schemes is already taken; nothing is registered then.
    pub fn register(&mut self, provisioner: Arc<dyn Provisioner>) -> Result<(), ProvisionError> {
        let schemes = provisioner.schemes_handled();
        if let Some(taken) = schemes.iter().find(|s| self.provisioners.contains_key(s.as_str())) {
            return Err(ProvisionError::Validation(format!(
                "scheme '{}' is already registered",
                taken
            )));
        }
        for scheme in schemes {
            tracing::debug!("registered provisioner for scheme '{}'", scheme);
            self.provisioners.insert(scheme, Arc::clone(&provisioner));
        }
        Ok(())
    }

    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn Provisioner>> {
        self.provisioners.get(scheme)
    }

    /// Returns the registered schemes in sorted order.
    pub fn schemes(&self) -> Vec<&str> {
        self.provisioners.keys().map(String::as_str).collect()
    }

    /// Returns the lowercased scheme of `locator`.
    pub fn scheme_of(locator: &str) -> Result<String, ProvisionError> {
        let url = Url::parse(locator)
            .map_err(|e| ProvisionError::Validation(format!("invalid locator '{}': {}", locator, e)))?;
        Ok(url.scheme().to_string())
    }

    /// Returns the provisioner responsible for `locator`.
    pub fn for_locator(&self, locator: &str) -> Result<&Arc<dyn Provisioner>, ProvisionError> {
        let scheme = Self::scheme_of(locator)?;
        self.get(&scheme).ok_or_else(|| {
            ProvisionError::Validation(format!("no provisioner registered for scheme '{}'", scheme))
        })
    }

    /// Downloads `locator` to `destination` with the matching provisioner.
    pub fn download_from(&self, locator: &str, destination: &Utf8Path) -> Result<bool> {
        let provisioner = self.for_locator(locator)?;
        if !provisioner.capabilities().download {
            return Err(ProvisionError::unsupported(Self::scheme_of(locator)?, "download").into());
        }
        provisioner.download_from(locator, destination)
    }

    /// Uploads `source` to `locator` with the matching provisioner.
    pub fn upload_to(&self, locator: &str, source: &Utf8Path, metadata: Option<&str>) -> Result<bool> {
        let provisioner = self.for_locator(locator)?;
        if !provisioner.capabilities().upload {
            return Err(ProvisionError::unsupported(Self::scheme_of(locator)?, "upload").into());
        }
        provisioner.upload_to(locator, source, metadata)
    }
}

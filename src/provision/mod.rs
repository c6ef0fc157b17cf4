//! Provisioners for moving files to and from remote backends.
//!
//! This module provides the trait and implementations for the supported
//! backend tools (s3cmd, icgc-get). Each provisioner turns the uniform
//! download/upload contract into invocations of its tool through a
//! [`CommandExecutor`](crate::executor::CommandExecutor).

use std::collections::BTreeSet;

use anyhow::Result;
use camino::Utf8Path;

use crate::error::ProvisionError;

mod args;
mod client;
pub mod icgc_get;
pub mod s3cmd;
mod settings;
mod staging;

pub use args::CommandArgsBuilder;
pub use client::ClientCommand;
pub use icgc_get::IcgcGetProvisioner;
pub use s3cmd::S3cmdProvisioner;
pub use settings::{
    BackendDefaults, CLIENT_KEY, CONFIG_FILE_KEY, ProvisionerSettings, VERBOSITY_KEY,
};

/// Transfer directions a provisioner supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub download: bool,
    pub upload: bool,
}

/// Trait for provisioner implementations.
///
/// Implementations hold only immutable settings after construction, so one
/// instance can serve concurrent transfers.
pub trait Provisioner: Send + Sync {
    /// Returns the locator schemes this provisioner accepts.
    fn schemes_handled(&self) -> BTreeSet<String>;

    /// Returns the transfer directions this provisioner supports.
    fn capabilities(&self) -> Capabilities;

    /// Downloads the remote object at `locator` to `destination` (a file path).
    ///
    /// Returns `Ok(false)` when the tool reports an expected failure and an
    /// error for anything the backend does not recognize.
    fn download_from(&self, locator: &str, destination: &Utf8Path) -> Result<bool>;

    /// Uploads the local `source` to the remote `locator`.
    ///
    /// A locator ending in `/` denotes a remote directory.
    fn upload_to(&self, locator: &str, source: &Utf8Path, metadata: Option<&str>) -> Result<bool>;
}

/// Removes the `<scheme>://` prefix from `locator`.
///
/// The scheme comparison ignores ASCII case.
pub(crate) fn strip_scheme<'a>(locator: &'a str, scheme: &str) -> Result<&'a str, ProvisionError> {
    match locator.split_once("://") {
        Some((head, rest)) if head.eq_ignore_ascii_case(scheme) => Ok(rest),
        _ => Err(ProvisionError::Validation(format!(
            "locator '{}' does not start with {}://",
            locator, scheme
        ))),
    }
}

//! Staging directory handling for downloads that nest their output.
//!
//! icgc-get saves an object as `<original file name>/<object id>` under its
//! output directory, next to a `logs` directory. The download is staged in
//! a private directory and the payload is then moved to the exact path the
//! caller asked for.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use uuid::Uuid;

use crate::error::ProvisionError;

/// Directory name the tool uses for its own log files.
const LOGS_DIR: &str = "logs";

/// RAII guard that removes a staging directory, even on error.
pub(crate) struct StagingDir {
    path: Utf8PathBuf,
}

impl StagingDir {
    /// Creates a fresh hidden staging directory inside `parent`.
    pub(crate) fn create_in(parent: &Utf8Path, label: &str) -> Result<Self, ProvisionError> {
        let path = parent.join(format!(".{}-staging-{}", label, Uuid::new_v4()));
        fs::create_dir_all(&path).map_err(|e| {
            ProvisionError::io(format!("failed to create staging directory: {}", path), e)
        })?;
        tracing::debug!("created staging directory: {}", path);
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!("cleaned up staging directory: {}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("staging directory already removed: {}", self.path);
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path,
                    error_kind = ?e.kind(),
                    "failed to cleanup staging directory: {}",
                    e,
                );
            }
        }
    }
}

fn is_skipped(name: &str) -> bool {
    name == LOGS_DIR || name.starts_with('.')
}

/// Finds the first regular file under `dir`, walking entries in name order.
///
/// The `logs` directory and dot-entries are skipped at every level.
pub(crate) fn find_payload(dir: &Utf8Path) -> Result<Option<Utf8PathBuf>, ProvisionError> {
    let read_dir = dir
        .read_dir_utf8()
        .map_err(|e| ProvisionError::io(format!("failed to read directory: {}", dir), e))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry =
            entry.map_err(|e| ProvisionError::io(format!("failed to read entry in: {}", dir), e))?;
        if !is_skipped(entry.file_name()) {
            entries.push(entry);
        }
    }
    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));

    for entry in entries {
        let file_type = entry.file_type().map_err(|e| {
            ProvisionError::io(format!("failed to read file type: {}", entry.path()), e)
        })?;
        if file_type.is_file() {
            return Ok(Some(entry.into_path()));
        }
        if file_type.is_dir()
            && let Some(found) = find_payload(entry.path())?
        {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Moves `payload` to `destination`, replacing an existing file.
///
/// Falls back to copy-and-remove when a rename is not possible.
pub(crate) fn move_into_place(
    payload: &Utf8Path,
    destination: &Utf8Path,
) -> Result<(), ProvisionError> {
    if let Err(e) = fs::rename(payload, destination) {
        tracing::debug!("rename {} -> {} failed ({}), copying", payload, destination, e);
        fs::copy(payload, destination).map_err(|e| {
            ProvisionError::io(format!("failed to copy {} to {}", payload, destination), e)
        })?;
        fs::remove_file(payload)
            .map_err(|e| ProvisionError::io(format!("failed to remove {}", payload), e))?;
    }
    Ok(())
}

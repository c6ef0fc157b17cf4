//! Domain-specific error types for fileprov.
//!
//! This module defines `ProvisionError`, a `thiserror`-based enum that
//! provides typed error variants for the failure modes of a transfer.
//! Trait boundaries ([`CommandExecutor`](crate::executor::CommandExecutor),
//! [`Provisioner`](crate::provision::Provisioner)) use `anyhow::Result`;
//! callers that need to react to a specific failure recover the typed
//! variant with `downcast_ref::<ProvisionError>()`.
//!
//! Soft failures (the wrapped tool exited with a recognized "did not
//! succeed" code) are never errors: they surface as `Ok(false)`.

use std::io;

/// Formats an IO error kind into a human-readable message.
///
/// Provides consistent messages for common IO error kinds
/// (e.g., "I/O error: not found") instead of the OS-level messages
/// (e.g., "No such file or directory (os error 2)"). For unrecognized
/// error kinds, falls back to the OS-level error message.
pub(crate) fn io_error_kind_message(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "I/O error: not found".to_string(),
        io::ErrorKind::PermissionDenied => "I/O error: permission denied".to_string(),
        io::ErrorKind::IsADirectory => "I/O error: is a directory".to_string(),
        _ => format!("I/O error: {}", err),
    }
}

/// Domain-specific error type for fileprov.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProvisionError {
    /// The backend cannot perform the requested transfer direction.
    ///
    /// Raised before any subprocess is started.
    #[error("operation not supported: {operation} is not available for scheme '{scheme}'")]
    Unsupported {
        /// Scheme of the backend that rejected the operation.
        scheme: String,
        /// The rejected direction (`"upload"` or `"download"`).
        operation: String,
    },

    /// A locator or other input was rejected before running anything.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend client executable could not be resolved.
    #[error("command not found in PATH: {command}")]
    CommandNotFound {
        /// The program that was looked up.
        command: String,
    },

    /// The subprocess could not be run to completion (spawn failure,
    /// wait failure, reader thread panic, etc.).
    #[error("command execution failed: {command}: {status}")]
    Execution {
        /// The command that was executed.
        command: String,
        /// Human-readable reason for the failure.
        status: String,
    },

    /// The subprocess exited with a code the backend does not recognize
    /// as a soft failure.
    #[error("process exited with exit code {code}: {command}")]
    ExitCode {
        /// The resolved command line, arguments included.
        command: String,
        /// The raw exit code.
        code: i32,
    },

    /// The subprocess was killed by a signal other than an interruption
    /// request, e.g. it crashed or was killed by the OOM killer.
    #[error("process terminated by signal {signal}: {command}")]
    Signal {
        /// The resolved command line, arguments included.
        command: String,
        /// The terminating signal number.
        signal: i32,
    },

    /// A download staged by the backend did not produce the expected layout.
    #[error("staging error: {0}")]
    Staging(String),

    /// A configuration file could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O operation failed with contextual information.
    #[error("{context}: {message}")]
    Io {
        /// What was being done when the error occurred, usually with a path.
        context: String,
        /// Message derived from [`io_error_kind_message`].
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    /// Creates an `Io` variant with the `message` field derived from `source`.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: io_error_kind_message(&source),
            source,
        }
    }

    /// Creates an `Unsupported` variant.
    pub(crate) fn unsupported(scheme: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            scheme: scheme.into(),
            operation: operation.into(),
        }
    }
}

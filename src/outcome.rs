//! Exit code classification for backend tools.
//!
//! A non-zero exit can mean the remote operation legitimately did not
//! happen (object absent, transient network trouble) or that the invocation
//! itself is broken. Each backend declares which codes belong to the first
//! group in an [`ExitCodeTable`]; everything else is fatal.
//!
//! A tool stopped from outside by hangup, interrupt or termination did not
//! fail on its own and counts as a soft failure. Any other terminating
//! signal means the tool crashed and is fatal.

use crate::error::ProvisionError;
use crate::executor::ExecutionResult;

const SIGHUP: i32 = 1;
const SIGINT: i32 = 2;
const SIGTERM: i32 = 15;

/// Signals that interrupt a tool without indicating a fault in it.
pub const INTERRUPT_SIGNALS: &[i32] = &[SIGHUP, SIGINT, SIGTERM];

/// Classified result of a backend tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The tool exited with code 0.
    Success,
    /// The operation did not complete for an expected reason.
    SoftFailure,
    /// The invocation failed in a way the backend does not recognize.
    FatalFailure,
}

impl TransferOutcome {
    /// Converts the outcome into the boolean transfer contract.
    ///
    /// `SoftFailure` becomes `Ok(false)`. `FatalFailure` becomes
    /// [`ProvisionError::ExitCode`], or [`ProvisionError::Signal`] when the
    /// process was killed, carrying `command`.
    pub fn into_result(
        self,
        command: &str,
        result: &ExecutionResult,
    ) -> Result<bool, ProvisionError> {
        match self {
            Self::Success => Ok(true),
            Self::SoftFailure => {
                tracing::info!(
                    code = ?result.code,
                    signal = ?result.signal,
                    "{} did not complete",
                    command
                );
                Ok(false)
            }
            Self::FatalFailure => match (result.code, result.signal) {
                (None, Some(signal)) => {
                    tracing::error!("process terminated by signal {}: {}", signal, command);
                    Err(ProvisionError::Signal {
                        command: command.to_string(),
                        signal,
                    })
                }
                (code, _) => {
                    let code = code.unwrap_or(-1);
                    tracing::error!("process exited with exit code {}: {}", code, command);
                    Err(ProvisionError::ExitCode {
                        command: command.to_string(),
                        code,
                    })
                }
            },
        }
    }
}

/// Exit codes a backend tool documents as expected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodeTable {
    /// Codes classified as [`TransferOutcome::SoftFailure`].
    pub soft: &'static [i32],
    /// Code the tool uses when a resource it was asked to create already exists.
    pub already_exists: Option<i32>,
}

/// s3cmd `EX_CONFLICT`: 409 Conflict, e.g. the bucket already exists.
pub const S3CMD_EX_CONFLICT: i32 = 13;

impl ExitCodeTable {
    /// s3cmd's exit codes, see `S3/ExitCodes.py` in the s3cmd sources:
    /// 65 `EX_DATAERR` (failed transfer), 71 `EX_OSERR`, 74 `EX_IOERR`,
    /// 75 `EX_TEMPFAIL` (retry later).
    pub const S3CMD: Self = Self {
        soft: &[65, 71, 74, 75],
        already_exists: Some(S3CMD_EX_CONFLICT),
    };

    /// icgc-get documents no recoverable exit codes.
    pub const ICGC_GET: Self = Self {
        soft: &[],
        already_exists: None,
    };

    /// Classifies how a process ended.
    pub fn classify(&self, result: &ExecutionResult) -> TransferOutcome {
        match (result.code, result.signal) {
            (Some(0), _) => TransferOutcome::Success,
            (Some(code), _) if self.soft.contains(&code) => TransferOutcome::SoftFailure,
            (Some(_), _) => TransferOutcome::FatalFailure,
            (None, Some(signal)) if INTERRUPT_SIGNALS.contains(&signal) => {
                TransferOutcome::SoftFailure
            }
            (None, _) => TransferOutcome::FatalFailure,
        }
    }

    /// Returns true if `code` is this tool's "already exists" code.
    pub fn is_already_exists(&self, code: Option<i32>) -> bool {
        self.already_exists.is_some() && code == self.already_exists
    }
}

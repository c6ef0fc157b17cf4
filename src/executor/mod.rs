//! Command execution abstraction for fileprov.
//!
//! This module provides:
//! - [`CommandSpec`]: A backend tool invocation as an explicit argument vector
//! - [`ExecutionResult`]: Exit code and captured output of a finished process
//! - [`CommandExecutor`]: Trait for command execution strategies
//! - [`RealCommandExecutor`]: Production implementation using `std::process::Command`
//!
//! Provisioners only ever talk to `dyn CommandExecutor`, so tests can
//! substitute a fake that returns scripted exit codes and output.

mod pipe;
mod real;

use std::fmt;

use anyhow::Result;

pub use real::RealCommandExecutor;

/// Formats string arguments into a space-separated, debug-quoted string.
///
/// Used by error messages and dry-run output to consistently format
/// command arguments (e.g., `"-c" "/home/user/.s3cfg" "info"`).
pub(crate) fn format_command_args(args: &[String]) -> String {
    args.iter()
        .map(|a| format!("{:?}", a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// How the child's stderr is connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// stderr shares stdout's pipe, so interleaved lines keep their order.
    Merged,
    /// stdout and stderr are captured separately.
    #[default]
    Separate,
}

/// Where echoed output lines go while the command runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoTarget {
    /// The console, with carriage-return progress emulation.
    #[default]
    Console,
    /// Debug-level log events only.
    Diagnostic,
    /// Nothing is echoed; output is still captured.
    Silent,
}

/// Specification for a command to be executed
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to execute (a name looked up in PATH, or a path)
    pub command: String,
    /// Command arguments, one token each; never re-split on whitespace
    pub args: Vec<String>,
    /// How stderr is connected
    pub output: OutputMode,
    /// Where output lines are echoed
    pub echo: EchoTarget,
    /// Print a newline once output is drained, terminating a progress line
    /// the tool left open
    pub trailing_newline: bool,
}

impl CommandSpec {
    /// Creates a new CommandSpec with command and args
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            output: OutputMode::default(),
            echo: EchoTarget::default(),
            trailing_newline: false,
        }
    }

    /// Sets the output mode
    #[must_use]
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Sets the echo target
    #[must_use]
    pub fn with_echo(mut self, echo: EchoTarget) -> Self {
        self.echo = echo;
        self
    }

    /// Requests a trailing newline after the output has been drained
    #[must_use]
    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.command)
        } else {
            write!(f, "{} {}", self.command, format_command_args(&self.args))
        }
    }
}

/// Result of command execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code, or `None` if the process was terminated by a signal
    pub code: Option<i32>,
    /// Number of the signal that terminated the process, if any
    pub signal: Option<i32>,
    /// Captured stdout text (includes stderr in merged mode)
    pub stdout: String,
    /// Captured stderr text (empty in merged mode)
    pub stderr: String,
    /// True when the command was only logged, not run
    pub dry_run: bool,
}

impl ExecutionResult {
    /// Creates a result with the given exit code and no captured output.
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// Creates a result for a process terminated by `signal`.
    pub fn from_signal(signal: i32) -> Self {
        Self {
            signal: Some(signal),
            ..Self::default()
        }
    }

    /// Creates the result reported for a command skipped in dry-run mode.
    ///
    /// Reports exit code 0 so the surrounding flow continues.
    pub fn dry_run() -> Self {
        Self {
            code: Some(0),
            dry_run: true,
            ..Self::default()
        }
    }

    /// Returns true if the command exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for command execution.
///
/// Implementations must be `Send + Sync` so provisioners holding an
/// `Arc<dyn CommandExecutor>` can be shared across threads.
pub trait CommandExecutor: Send + Sync {
    /// Executes a command, blocking until it exits and its output is drained.
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult>;
}

//! Real command executor implementation.
//!
//! This module provides [`RealCommandExecutor`], which runs backend tools
//! with `std::process::Command` and drains their output on a dedicated
//! reader thread while the calling thread waits for exit.

use std::fs::File;
use std::io::{self, Read};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use anyhow::Result;
use rustix::pipe::{PipeFlags, pipe_with};
use which::which;

use super::pipe::{StreamType, drain_output, panic_message};
use super::{CommandExecutor, CommandSpec, ExecutionResult, OutputMode};
use crate::error::ProvisionError;

/// Cleans up a child process and its reader thread.
///
/// Kills the child, waits for it to terminate and joins the reader so no
/// thread is left blocked on the pipe. Called from error paths in
/// [`RealCommandExecutor::execute()`].
fn cleanup_child_process(child: &mut Child, handle: Option<JoinHandle<String>>) {
    let pid = child.id();
    if let Err(e) = child.kill() {
        tracing::debug!(pid = pid, "kill returned error (process may have already exited): {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::warn!(pid = pid, "failed to wait for child process after kill: {}", e);
    }
    if let Some(handle) = handle
        && let Err(e) = handle.join()
    {
        tracing::warn!("reader thread panicked during cleanup: {}", panic_message(&*e));
    }
}

/// Spawns `command` with stderr joined into stdout through one pipe.
///
/// Both child descriptors are write ends of the same pipe, so lines reach
/// the reader in the order the tool wrote them.
fn spawn_merged(command: &mut Command) -> io::Result<(Child, File)> {
    let (reader, writer) = pipe_with(PipeFlags::CLOEXEC).map_err(io::Error::from)?;
    let writer_err = writer.try_clone()?;
    command.stdout(Stdio::from(writer));
    command.stderr(Stdio::from(writer_err));
    let child = command.spawn()?;
    Ok((child, File::from(reader)))
}

/// Command executor that runs actual system commands.
///
/// When `dry_run` is true, commands are logged but not executed, and
/// `execute()` reports exit code 0 with no output.
pub struct RealCommandExecutor {
    pub dry_run: bool,
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        if self.dry_run {
            tracing::info!("dry run: {}", spec);
            return Ok(ExecutionResult::dry_run());
        }

        let cmd = which(&spec.command).map_err(|_| ProvisionError::CommandNotFound {
            command: spec.command.clone(),
        })?;
        tracing::trace!("command found: {}: {}", spec.command, cmd.to_string_lossy());
        tracing::debug!("executing command: {}", spec);

        let mut command = Command::new(cmd);
        command.args(&spec.args);
        command.stdin(Stdio::null());

        let spawned: io::Result<(Child, Box<dyn Read + Send>)> = match spec.output {
            OutputMode::Merged => spawn_merged(&mut command)
                .map(|(child, reader)| (child, Box::new(reader) as Box<dyn Read + Send>)),
            OutputMode::Separate => {
                command.stdout(Stdio::piped());
                command.stderr(Stdio::piped());
                command.spawn().and_then(|mut child| {
                    let stdout = child.stdout.take().ok_or_else(|| {
                        io::Error::other("stdout pipe missing after spawn with Stdio::piped()")
                    })?;
                    Ok((child, Box::new(stdout) as Box<dyn Read + Send>))
                })
            }
        };
        // The parent's copies of the merged pipe's write ends live in `command`;
        // they must be closed or the reader never sees EOF.
        drop(command);

        let (mut child, stdout_pipe) = spawned.map_err(|e| ProvisionError::Execution {
            command: spec.to_string(),
            status: format!("failed to spawn: {}", e),
        })?;
        tracing::trace!("spawned command: {}: pid={}", spec.command, child.id());

        let echo = spec.echo;
        let trailing_newline = spec.trailing_newline;
        let stdout_handle = match thread::Builder::new()
            .name("output-reader".to_string())
            .spawn(move || {
                drain_output(stdout_pipe, StreamType::Stdout, echo, trailing_newline, &mut io::stdout())
            }) {
            Ok(handle) => handle,
            Err(e) => {
                cleanup_child_process(&mut child, None);
                return Err(ProvisionError::Execution {
                    command: spec.to_string(),
                    status: format!("failed to spawn output reader thread: {}", e),
                }
                .into());
            }
        };

        // Separate mode: drain stderr here while the reader thread handles stdout
        let stderr = match child.stderr.take() {
            Some(pipe) => drain_output(pipe, StreamType::Stderr, echo, false, &mut io::sink()),
            None => String::new(),
        };

        let status = match child.wait() {
            Ok(s) => s,
            Err(e) => {
                cleanup_child_process(&mut child, Some(stdout_handle));
                return Err(ProvisionError::Execution {
                    command: spec.to_string(),
                    status: format!("failed to wait for command: {}", e),
                }
                .into());
            }
        };

        let stdout = match stdout_handle.join() {
            Ok(text) => text,
            Err(e) => {
                let msg = panic_message(&*e);
                tracing::error!(stream = "stdout", panic = msg, "reader thread panicked");
                return Err(ProvisionError::Execution {
                    command: spec.to_string(),
                    status: format!("reader thread panicked during command execution: {}", msg),
                }
                .into());
            }
        };

        if let Some(signal) = status.signal() {
            tracing::warn!("{} was terminated by signal {}", spec.command, signal);
        }
        tracing::trace!("executed command: {}: code={:?}", spec.command, status.code());

        Ok(ExecutionResult {
            code: status.code(),
            signal: status.signal(),
            stdout,
            stderr,
            dry_run: false,
        })
    }
}

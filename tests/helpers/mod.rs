use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};

use camino::{Utf8Path, Utf8PathBuf};
use fileprov::executor::{CommandExecutor, CommandSpec, ExecutionResult};

/// Executor that records every command and replies with scripted exit codes.
///
/// Codes are consumed in order; once exhausted every command exits with 0.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedExecutor {
    codes: Mutex<VecDeque<i32>>,
    calls: Mutex<Vec<CommandSpec>>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new(codes: &[i32]) -> Arc<Self> {
        Arc::new(Self {
            codes: Mutex::new(codes.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns the subcommand of each recorded call (the token after the config flag pair).
    pub fn subcommands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|spec| spec.args.get(2).cloned().unwrap_or_default())
            .collect()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&self, spec: &CommandSpec) -> anyhow::Result<ExecutionResult> {
        self.calls.lock().unwrap().push(spec.clone());
        let code = self.codes.lock().unwrap().pop_front().unwrap_or(0);
        Ok(ExecutionResult::from_code(code))
    }
}

/// Executor delegating to a closure, for fakes with side effects.
#[allow(dead_code)]
pub struct FnExecutor<F>(pub F);

impl<F> CommandExecutor for FnExecutor<F>
where
    F: Fn(&CommandSpec) -> anyhow::Result<ExecutionResult> + Send + Sync,
{
    fn execute(&self, spec: &CommandSpec) -> anyhow::Result<ExecutionResult> {
        (self.0)(spec)
    }
}

/// Creates a temporary directory and returns it with its UTF-8 path.
#[allow(dead_code)]
pub fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("non-UTF-8 temp dir");
    (dir, path)
}

/// Writes an executable shell script standing in for a backend client.
#[allow(dead_code)]
pub fn write_fake_client(dir: &Utf8Path, name: &str, body: &str) -> Utf8PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("failed to write fake client");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

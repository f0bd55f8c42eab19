//! External process execution with captured output.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{PublisherError, Result};
use crate::obs;

/// A single external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable path or name.
    pub program: PathBuf,

    /// Arguments, in order.
    pub args: Vec<String>,

    /// Working directory; inherits the current one when `None`.
    pub current_dir: Option<PathBuf>,

    /// Upper bound on wall-clock time.
    pub timeout: Option<Duration>,

    /// Indices into `args` that must be masked when displayed.
    secret_args: Vec<usize>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
            secret_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument that is passed verbatim but shown as `***`.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether `tokens` appear in `args` in order (not necessarily adjacent).
    pub fn has_args(&self, tokens: &[&str]) -> bool {
        let mut remaining = tokens.iter().peekable();
        for arg in &self.args {
            if remaining.peek().is_some_and(|t| **t == arg.as_str()) {
                remaining.next();
            }
        }
        remaining.peek().is_none()
    }

    /// Command line for logs and error messages, secrets masked.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for (i, arg) in self.args.iter().enumerate() {
            line.push(' ');
            if self.secret_args.contains(&i) {
                line.push_str("***");
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code; `None` when terminated by a signal.
    pub exit_code: Option<i32>,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// A successful outcome with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 0,
        }
    }

    /// A failed outcome with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 0,
        }
    }
}

/// Capability to run external processes.
///
/// A non-zero exit is *not* an error at this layer: the outcome is returned
/// and the caller decides. Errors are reserved for spawn failures and
/// timeouts.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        let start = Instant::now();

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let child = command
            .spawn()
            .map_err(|e| PublisherError::io(&spec.program, e))?;

        // Dropping the future on timeout kills the child.
        let output = match spec.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| PublisherError::Timeout {
                    operation: spec.display(),
                    timeout_secs: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| PublisherError::io(&spec.program, e))?;

        let outcome = CommandOutcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        obs::emit_command_executed(&spec.display(), outcome.exit_code, outcome.duration_ms);
        Ok(outcome)
    }
}

use crate::config::CommandSpec;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of one external control command.
///
/// A non-zero exit code is data, not an error: the orchestrator
/// classifies operations from a liveness recheck, never from the exit
/// code alone, so every completed command produces an output.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    /// Exit code, if the command ran to completion and was not killed.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the bounded timeout elapsed before the command finished.
    pub timed_out: bool,
}

impl CommandOutput {
    /// Whether the command completed with exit code zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    fn from_timeout(spec: &CommandSpec, timeout: Duration) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: format!(
                "command '{}' timed out after {}s",
                spec.display(),
                timeout.as_secs()
            ),
            timed_out: true,
        }
    }
}

/// Executes external control commands with a bounded timeout.
///
/// This is the seam between the orchestrator and the operating system;
/// tests substitute a scripted implementation.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command, waiting at most `timeout` for it to finish.
    ///
    /// The only `Err` path is a launch failure (missing or
    /// non-executable binary). A command that runs and exits non-zero,
    /// or that is cut off by the timeout, still yields `Ok`.
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<CommandOutput>;
}

/// The real command runner, backed by `tokio::process`.
pub struct CommandRunner;

impl CommandRunner {
    /// Create a new command runner.
    pub fn new() -> Self {
        Self
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for CommandRunner {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<CommandOutput> {
        tracing::debug!(
            command = %spec.display(),
            timeout_secs = timeout.as_secs(),
            "Running control command"
        );

        let mut command = Command::new(&spec.command);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the in-flight future on timeout must not leave the
            // command running unbounded.
            .kill_on_drop(true);

        match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => {
                let result = CommandOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    timed_out: false,
                };
                tracing::debug!(
                    command = %spec.display(),
                    exit_code = ?result.exit_code,
                    "Control command finished"
                );
                Ok(result)
            }
            Ok(Err(e)) => Err(Error::CommandFailed(format!(
                "Failed to launch '{}': {}",
                spec.display(),
                e
            ))),
            Err(_) => {
                tracing::warn!(
                    command = %spec.display(),
                    timeout_secs = timeout.as_secs(),
                    "Control command timed out"
                );
                Ok(CommandOutput::from_timeout(spec, timeout))
            }
        }
    }
}

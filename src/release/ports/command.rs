//! Port for running external shell commands inside a working directory.

use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::Arc;
use thiserror::Error;

/// Result type for command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Captured output of a command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns the last non-blank line of standard output.
    #[must_use]
    pub fn last_stdout_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
    }
}

/// Shell command execution contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` through the shell with `working_dir` as its current
    /// directory and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] when the process cannot start and
    /// [`CommandError::Failed`] when it exits unsuccessfully.
    async fn run(&self, command: &str, working_dir: &Utf8Path) -> CommandResult<CommandOutput> {
        self.run_with_env(command, working_dir, &[]).await
    }

    /// Runs `command` like [`CommandRunner::run`] with extra environment
    /// variables. Secrets go here so that they never appear in the command
    /// text, which is logged and reported on failure.
    ///
    /// # Errors
    ///
    /// As [`CommandRunner::run`].
    async fn run_with_env(
        &self,
        command: &str,
        working_dir: &Utf8Path,
        env: &[(String, String)],
    ) -> CommandResult<CommandOutput>;
}

/// Errors returned by command runners.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The process could not be started.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        /// Command line that failed to start.
        command: String,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },

    /// Waiting for the process or collecting its output failed.
    #[error("failed to wait for `{command}`: {source}")]
    Wait {
        /// Command line being awaited.
        command: String,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },

    /// The process exited unsuccessfully.
    #[error("`{command}` {}: {detail}", describe_exit(.code))]
    Failed {
        /// Command line that failed.
        command: String,
        /// Exit code, absent when the process was killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error (or standard output when stderr is empty).
        detail: String,
    },
}

impl CommandError {
    /// Wraps a spawn failure.
    #[must_use]
    pub fn spawn(command: impl Into<String>, err: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source: Arc::new(err),
        }
    }

    /// Wraps a failure while waiting for a running process.
    #[must_use]
    pub fn wait(command: impl Into<String>, err: std::io::Error) -> Self {
        Self::Wait {
            command: command.into(),
            source: Arc::new(err),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(
        || "was terminated by a signal".to_owned(),
        |value| format!("exited with status {value}"),
    )
}

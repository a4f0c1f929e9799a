//! Scripted command runner.

use async_trait::async_trait;
use camino::Utf8Path;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::release::ports::{CommandError, CommandOutput, CommandResult, CommandRunner};

/// Runner that succeeds for every command except the scripted failures.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommandRunner {
    failures: HashMap<String, String>,
    program_failures: HashMap<String, String>,
    executed: Arc<Mutex<Vec<String>>>,
    environments: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl ScriptedCommandRunner {
    /// Creates a runner on which every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `command` exit with status 1 and `detail` on stderr.
    #[must_use]
    pub fn failing_on(mut self, command: impl Into<String>, detail: impl Into<String>) -> Self {
        self.failures.insert(command.into(), detail.into());
        self
    }

    /// Makes every command whose first word is `program` exit with status 1
    /// and `detail` on stderr.
    #[must_use]
    pub fn failing_on_program(
        mut self,
        program: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        self.program_failures.insert(program.into(), detail.into());
        self
    }

    /// Returns the commands run so far, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the extra environment of each command run so far, in order.
    #[must_use]
    pub fn environments(&self) -> Vec<Vec<(String, String)>> {
        self.environments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn failure_for(&self, command: &str) -> Option<&String> {
        self.failures.get(command).or_else(|| {
            command
                .split_whitespace()
                .next()
                .and_then(|program| self.program_failures.get(program))
        })
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn run_with_env(
        &self,
        command: &str,
        _working_dir: &Utf8Path,
        env: &[(String, String)],
    ) -> CommandResult<CommandOutput> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.to_owned());
        self.environments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(env.to_vec());

        self.failure_for(command).map_or_else(
            || Ok(CommandOutput::default()),
            |detail| {
                Err(CommandError::Failed {
                    command: command.to_owned(),
                    code: Some(1),
                    detail: detail.clone(),
                })
            },
        )
    }
}

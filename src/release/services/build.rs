//! Ordered dependency install and build steps.

use crate::config::CiConfig;
use crate::release::{
    domain::PlatformType,
    ports::{CommandError, CommandRunner},
};
use camino::Utf8Path;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// One step of a build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    /// `npm install`.
    InstallDependencies,
    /// `npm install --dev`.
    InstallDevDependencies,
    /// The platform type's configured build command.
    Build,
}

impl BuildStep {
    /// All steps in execution order.
    pub const ORDER: [Self; 3] = [
        Self::InstallDependencies,
        Self::InstallDevDependencies,
        Self::Build,
    ];

    /// Returns a short step label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InstallDependencies => "install dependencies",
            Self::InstallDevDependencies => "install dev dependencies",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`BuildRunner::build`].
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// No build command is configured for the platform type.
    #[error("no build command configured for mini-program type {0}")]
    UnknownTarget(String),

    /// A step failed; later steps were not run.
    #[error("{source}")]
    StepFailed {
        /// Step that failed.
        step: BuildStep,
        /// Command failure of that step.
        source: CommandError,
    },
}

impl BuildError {
    /// Returns the failed step, if a step ran and failed.
    #[must_use]
    pub const fn step(&self) -> Option<BuildStep> {
        match self {
            Self::UnknownTarget(_) => None,
            Self::StepFailed { step, .. } => Some(*step),
        }
    }
}

/// Result type for builds.
pub type BuildResult<T> = Result<T, BuildError>;

/// Runs the build steps of a project through a [`CommandRunner`].
#[derive(Clone)]
pub struct BuildRunner<R>
where
    R: CommandRunner,
{
    runner: Arc<R>,
    build_commands: BTreeMap<String, String>,
}

impl<R> BuildRunner<R>
where
    R: CommandRunner,
{
    /// Creates a build runner with explicit per-type build commands.
    #[must_use]
    pub const fn new(runner: Arc<R>, build_commands: BTreeMap<String, String>) -> Self {
        Self {
            runner,
            build_commands,
        }
    }

    /// Creates a build runner from the configured targets.
    #[must_use]
    pub fn from_config(runner: Arc<R>, config: &CiConfig) -> Self {
        let build_commands = config
            .targets
            .iter()
            .map(|(name, target)| (name.clone(), target.build_command.clone()))
            .collect();
        Self::new(runner, build_commands)
    }

    /// Runs every build step for `platform_type` inside `project_path`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownTarget`] before running anything when
    /// no build command is configured, otherwise the first failing step.
    pub async fn build(
        &self,
        platform_type: &PlatformType,
        project_path: &Utf8Path,
    ) -> BuildResult<()> {
        let build_command = self
            .build_commands
            .get(platform_type.as_str())
            .ok_or_else(|| BuildError::UnknownTarget(platform_type.as_str().to_owned()))?;

        for step in BuildStep::ORDER {
            let command = match step {
                BuildStep::InstallDependencies => "npm install",
                BuildStep::InstallDevDependencies => "npm install --dev",
                BuildStep::Build => build_command.as_str(),
            };
            self.runner
                .run(command, project_path)
                .await
                .map_err(|source| BuildError::StepFailed { step, source })?;
            tracing::debug!(step = %step, "build step finished");
        }
        Ok(())
    }
}

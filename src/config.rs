//! Run configuration loaded from TOML.
//!
//! A representative file:
//!
//! ```toml
//! workspace_root = "/var/lib/miniship"
//! fetch_timeout_secs = 3600
//!
//! [targets.wechat-mini]
//! store_download_path = "https://github.com/acme/wechat-mini.git"
//! build_command = "npm run build:weapp"
//!
//! [targets.alipay-mini]
//! store_download_path = "https://git.acme.dev/api/v4/projects/7/repository/archive"
//! private_token = "glpat-xxxx"
//! build_command = "npm run build:alipay"
//! fetch_timeout_secs = 900
//!
//! [platforms.wechat]
//! upload_command = "miniprogram-ci upload --pp {{ project_path }} -v {{ version }}"
//! preview_command = "miniprogram-ci preview --pp {{ project_path }} --qr-output {{ qr_code_path }}"
//! ```

use crate::release::domain::{Platform, PlatformType, VersionLabel, project_path};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Fetch budget applied when neither the file nor the target sets one.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60 * 60;

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiConfig {
    /// Directory under which run working directories are created.
    pub workspace_root: Utf8PathBuf,
    /// Global fetch budget in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Per mini-program type source and build settings.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
    /// Per platform vendor command templates.
    #[serde(default)]
    pub platforms: BTreeMap<Platform, PlatformCommandConfig>,
}

/// Source and build settings of one mini-program type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Git repository or archive endpoint holding the project.
    pub store_download_path: String,
    /// Access token appended to archive downloads.
    #[serde(default)]
    pub private_token: String,
    /// Platform-specific build command run after dependency installation.
    pub build_command: String,
    /// Fetch budget override in seconds.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
}

impl TargetConfig {
    /// Creates target settings without a token or timeout override.
    #[must_use]
    pub fn new(store_download_path: impl Into<String>, build_command: impl Into<String>) -> Self {
        Self {
            store_download_path: store_download_path.into(),
            private_token: String::new(),
            build_command: build_command.into(),
            fetch_timeout_secs: None,
        }
    }

    /// Sets the archive access token.
    #[must_use]
    pub fn with_private_token(mut self, token: impl Into<String>) -> Self {
        self.private_token = token.into();
        self
    }

    /// Overrides the fetch budget for this target.
    #[must_use]
    pub const fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = Some(secs);
        self
    }
}

/// Vendor command templates of one platform.
///
/// Templates are rendered with `minijinja`; every value is shell-quoted
/// before substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCommandConfig {
    /// Upload command; its last stdout line is the QR code URL.
    pub upload_command: String,
    /// Preview command; must write the QR image to `qr_code_path`.
    pub preview_command: String,
}

/// Errors returned while loading or querying configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// A fetch budget of zero seconds was configured.
    #[error("fetch timeout for {0} must be greater than zero")]
    ZeroFetchTimeout(String),

    /// A target has an empty build command.
    #[error("target {0} has an empty build command")]
    EmptyBuildCommand(String),

    /// No target is configured for the platform type.
    #[error("no target configured for mini-program type {0}")]
    UnknownTarget(String),
}

impl CiConfig {
    /// Creates a configuration with the default fetch budget and no
    /// targets.
    #[must_use]
    pub fn new(workspace_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            targets: BTreeMap::new(),
            platforms: BTreeMap::new(),
        }
    }

    /// Adds or replaces a target.
    #[must_use]
    pub fn with_target(mut self, platform_type: impl Into<String>, target: TargetConfig) -> Self {
        self.targets.insert(platform_type.into(), target);
        self
    }

    /// Adds or replaces a platform's command templates.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform, commands: PlatformCommandConfig) -> Self {
        self.platforms.insert(platform, commands);
        self
    }

    /// Sets the global fetch budget.
    #[must_use]
    pub const fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and the
    /// validation variants for inconsistent values.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// the errors of [`CiConfig::from_toml_str`].
    pub async fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| ConfigError::Read {
                path: path.to_owned(),
                source: Arc::new(err),
            })?;
        Self::from_toml_str(&raw)
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroFetchTimeout("the workspace".to_owned()));
        }
        for (name, target) in &self.targets {
            if target.build_command.trim().is_empty() {
                return Err(ConfigError::EmptyBuildCommand(name.clone()));
            }
            if target.fetch_timeout_secs == Some(0) {
                return Err(ConfigError::ZeroFetchTimeout(name.clone()));
            }
        }
        Ok(())
    }

    /// Returns the target configured for a platform type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTarget`] when none is configured.
    pub fn target(&self, platform_type: &PlatformType) -> Result<&TargetConfig, ConfigError> {
        self.targets
            .get(platform_type.as_str())
            .ok_or_else(|| ConfigError::UnknownTarget(platform_type.as_str().to_owned()))
    }

    /// Returns the fetch budget for a target.
    #[must_use]
    pub fn fetch_budget(&self, target: &TargetConfig) -> Duration {
        Duration::from_secs(target.fetch_timeout_secs.unwrap_or(self.fetch_timeout_secs))
    }

    /// Returns the working directory of a run.
    #[must_use]
    pub fn project_path(&self, platform_type: &PlatformType, version: &VersionLabel) -> Utf8PathBuf {
        project_path(&self.workspace_root, platform_type, version)
    }
}

const fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
mod tests {
    use super::{CiConfig, ConfigError, DEFAULT_FETCH_TIMEOUT_SECS};
    use crate::release::domain::{Platform, PlatformType};
    use std::time::Duration;

    const SAMPLE: &str = r#"
workspace_root = "/srv/miniship"

[targets.wechat-mini]
store_download_path = "https://github.com/acme/wechat-mini.git"
build_command = "npm run build:weapp"

[targets.toutiao-mini]
store_download_path = "https://git.acme.dev/api/v4/projects/9/repository/archive"
private_token = "secret"
build_command = "npm run build:tt"
fetch_timeout_secs = 120

[platforms.wechat]
upload_command = "upload {{ project_path }}"
preview_command = "preview {{ qr_code_path }}"
"#;

    #[test]
    fn parses_targets_and_platforms() {
        let config = CiConfig::from_toml_str(SAMPLE).expect("sample config should parse");

        assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(config.targets.len(), 2);
        assert!(config.platforms.contains_key(&Platform::Wechat));
    }

    #[test]
    fn target_override_wins_over_global_budget() {
        let config = CiConfig::from_toml_str(SAMPLE).expect("sample config should parse");
        let toutiao = PlatformType::new("toutiao-mini").expect("valid platform type");
        let wechat = PlatformType::new("wechat-mini").expect("valid platform type");

        let toutiao_target = config.target(&toutiao).expect("toutiao target");
        let wechat_target = config.target(&wechat).expect("wechat target");

        assert_eq!(config.fetch_budget(toutiao_target), Duration::from_secs(120));
        assert_eq!(config.fetch_budget(wechat_target), Duration::from_secs(3600));
    }

    #[test]
    fn unknown_target_is_reported() {
        let config = CiConfig::from_toml_str(SAMPLE).expect("sample config should parse");
        let alipay = PlatformType::new("alipay-mini").expect("valid platform type");

        assert!(matches!(
            config.target(&alipay),
            Err(ConfigError::UnknownTarget(name)) if name == "alipay-mini"
        ));
    }

    #[test]
    fn rejects_zero_timeout_and_empty_build_command() {
        let zero = "workspace_root = \"/tmp\"\nfetch_timeout_secs = 0\n";
        assert!(matches!(
            CiConfig::from_toml_str(zero),
            Err(ConfigError::ZeroFetchTimeout(_))
        ));

        let empty_build = concat!(
            "workspace_root = \"/tmp\"\n",
            "[targets.wechat-mini]\n",
            "store_download_path = \"https://github.com/acme/x\"\n",
            "build_command = \"  \"\n",
        );
        assert!(matches!(
            CiConfig::from_toml_str(empty_build),
            Err(ConfigError::EmptyBuildCommand(name)) if name == "wechat-mini"
        ));
    }

    #[test]
    fn rejects_unknown_platform_tables() {
        let raw = concat!(
            "workspace_root = \"/tmp\"\n",
            "[platforms.baidu]\n",
            "upload_command = \"x\"\n",
            "preview_command = \"y\"\n",
        );
        assert!(matches!(
            CiConfig::from_toml_str(raw),
            Err(ConfigError::Parse(_))
        ));
    }
}

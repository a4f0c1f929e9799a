//! Source locations and working directories for a run.

use super::{BranchName, PlatformType, VersionLabel};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

const REDACTED: &str = "***";

/// Where a run's project source is fetched from.
///
/// Neither `Display` nor `Debug` output includes the access token.
#[derive(Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// A git repository cloned at a branch.
    Git {
        /// Repository URL.
        repository: String,
        /// Branch to check out.
        branch: String,
    },
    /// A tarball downloaded over HTTP(S) from a hosting API.
    Archive {
        /// Archive endpoint up to and including the query separator.
        endpoint: String,
        /// Access token sent as the `private_token` query parameter.
        private_token: String,
        /// Ref selector, `ref=<branch>` or `sha=<branch>`.
        ref_param: String,
    },
}

impl SourceLocator {
    /// Derives the locator for a configured download location.
    ///
    /// Locations on GitHub are cloned directly. Any other location is
    /// treated as a private archive endpoint: the access token is appended,
    /// followed by `ref=<branch>` for v4 API paths or `sha=<branch>` for
    /// older ones.
    #[must_use]
    pub fn derive(location: &str, private_token: &str, branch: &BranchName) -> Self {
        if location.contains("github") {
            return Self::Git {
                repository: location.to_owned(),
                branch: branch.as_str().to_owned(),
            };
        }

        let ref_key = if location.contains("v4") { "ref" } else { "sha" };
        let separator = if location.contains('?') { '&' } else { '?' };
        Self::Archive {
            endpoint: format!("{location}{separator}"),
            private_token: private_token.to_owned(),
            ref_param: format!("{ref_key}={branch}"),
        }
    }

    /// Returns the download URL with `token` in the `private_token`
    /// parameter, or `None` for git sources.
    #[must_use]
    pub fn archive_url_with(&self, token: &str) -> Option<String> {
        match self {
            Self::Git { .. } => None,
            Self::Archive {
                endpoint,
                ref_param,
                ..
            } => Some(format!("{endpoint}private_token={token}&{ref_param}")),
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git { repository, branch } => write!(f, "{repository}#{branch}"),
            Self::Archive { .. } => {
                let url = self.archive_url_with(REDACTED).unwrap_or_default();
                write!(f, "direct:{url}")
            }
        }
    }
}

impl fmt::Debug for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git { repository, branch } => f
                .debug_struct("Git")
                .field("repository", repository)
                .field("branch", branch)
                .finish(),
            Self::Archive {
                endpoint,
                ref_param,
                ..
            } => f
                .debug_struct("Archive")
                .field("endpoint", endpoint)
                .field("private_token", &REDACTED)
                .field("ref_param", ref_param)
                .finish(),
        }
    }
}

/// Returns the working directory of a run.
///
/// The path depends only on its inputs, so two concurrent runs with the
/// same platform type and version share a directory. Callers must not
/// start such runs concurrently.
#[must_use]
pub fn project_path(
    workspace_root: &Utf8Path,
    platform_type: &PlatformType,
    version: &VersionLabel,
) -> Utf8PathBuf {
    workspace_root
        .join("miniprogram")
        .join(platform_type.as_str())
        .join(version.as_str())
}

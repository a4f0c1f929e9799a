//! Platform capability port: upload and preview through vendor tooling.

use super::CommandError;
use crate::release::domain::{PREVIEW_QR_FILE_NAME, PlatformType, VersionLabel};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Result type for platform capability calls.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Parameters of an upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Mini-program type being uploaded.
    pub platform_type: PlatformType,
    /// Built project directory.
    pub project_path: Utf8PathBuf,
    /// Version label for the upload.
    pub version: VersionLabel,
    /// Release description shown on the platform.
    pub description: String,
    /// Uploader identity understood by the platform (robot number, key id).
    pub identification: Option<String>,
    /// Whether the upload becomes the experience (trial) version.
    pub experience: bool,
}

/// Parameters of a preview call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    /// Mini-program type being previewed.
    pub platform_type: PlatformType,
    /// Built project directory.
    pub project_path: Utf8PathBuf,
    /// Generated version label.
    pub version: VersionLabel,
    /// Page opened by the preview QR code.
    pub page_path: Option<String>,
    /// Query string passed to the page.
    pub search_query: Option<String>,
    /// Launch scene value.
    pub scene: Option<String>,
}

impl PreviewRequest {
    /// Returns where the capability must write the preview QR image.
    #[must_use]
    pub fn qr_code_path(&self) -> Utf8PathBuf {
        preview_qr_path(&self.project_path)
    }
}

/// Returns the preview QR image path inside a project directory.
#[must_use]
pub fn preview_qr_path(project_path: &Utf8Path) -> Utf8PathBuf {
    project_path.join(PREVIEW_QR_FILE_NAME)
}

/// Upload and preview operations of one mini-program platform.
#[async_trait]
pub trait PlatformCapability: Send + Sync {
    /// Uploads the built project and returns the resulting QR code URL.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the platform rejects the upload.
    async fn upload(&self, request: &UploadRequest) -> CapabilityResult<String>;

    /// Generates a preview QR image at [`PreviewRequest::qr_code_path`].
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the platform tooling fails.
    async fn preview(&self, request: &PreviewRequest) -> CapabilityResult<()>;
}

/// Errors returned by platform capabilities.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// The platform rejected the request.
    #[error("platform rejected the request: {0}")]
    Rejected(String),

    /// The vendor tool could not be run or failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The vendor command template could not be rendered.
    #[error("failed to render platform command: {0}")]
    Template(String),
}

//! Scripted platform capability.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::release::ports::{
    CapabilityError, CapabilityResult, PlatformCapability, PreviewRequest, UploadRequest,
};

/// Bytes written as the preview image unless overridden.
const DEFAULT_PREVIEW_IMAGE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, b'q', b'r', 0xFF, 0xD9];

/// Capability with a fixed outcome for each operation.
///
/// On a successful preview it writes its image to the requested QR path
/// unless built with [`StaticCapability::without_preview_image`].
#[derive(Debug, Clone)]
pub struct StaticCapability {
    upload_outcome: Result<String, String>,
    preview_outcome: Result<Option<Vec<u8>>, String>,
    uploads: Arc<Mutex<Vec<UploadRequest>>>,
    previews: Arc<Mutex<Vec<PreviewRequest>>>,
}

impl StaticCapability {
    /// Creates a capability whose upload returns `qr_code_url`.
    #[must_use]
    pub fn succeeding(qr_code_url: impl Into<String>) -> Self {
        Self {
            upload_outcome: Ok(qr_code_url.into()),
            preview_outcome: Ok(Some(DEFAULT_PREVIEW_IMAGE.to_vec())),
            uploads: Arc::default(),
            previews: Arc::default(),
        }
    }

    /// Makes uploads fail with `message`.
    #[must_use]
    pub fn failing_upload(mut self, message: impl Into<String>) -> Self {
        self.upload_outcome = Err(message.into());
        self
    }

    /// Makes previews fail with `message`.
    #[must_use]
    pub fn failing_preview(mut self, message: impl Into<String>) -> Self {
        self.preview_outcome = Err(message.into());
        self
    }

    /// Writes `image` as the preview QR code.
    #[must_use]
    pub fn with_preview_image(mut self, image: impl Into<Vec<u8>>) -> Self {
        self.preview_outcome = Ok(Some(image.into()));
        self
    }

    /// Reports preview success without writing any image.
    #[must_use]
    pub fn without_preview_image(mut self) -> Self {
        self.preview_outcome = Ok(None);
        self
    }

    /// Returns the upload requests received so far.
    #[must_use]
    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the preview requests received so far.
    #[must_use]
    pub fn previews(&self) -> Vec<PreviewRequest> {
        self.previews
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PlatformCapability for StaticCapability {
    async fn upload(&self, request: &UploadRequest) -> CapabilityResult<String> {
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.upload_outcome.clone().map_err(CapabilityError::Rejected)
    }

    async fn preview(&self, request: &PreviewRequest) -> CapabilityResult<()> {
        self.previews
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let image = self
            .preview_outcome
            .clone()
            .map_err(CapabilityError::Rejected)?;
        if let Some(bytes) = image {
            tokio::fs::write(request.qr_code_path(), bytes)
                .await
                .map_err(|err| CapabilityError::Rejected(err.to_string()))?;
        }
        Ok(())
    }
}

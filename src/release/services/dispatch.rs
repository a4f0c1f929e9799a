//! Platform capability resolution.

use crate::release::{
    domain::{Platform, UnknownPlatform},
    ports::PlatformCapability,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`PlatformDispatcher::resolve`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The platform type names no known platform.
    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatform),

    /// The platform is known but no capability was registered for it.
    #[error("no capability registered for platform {0}")]
    Unregistered(Platform),
}

/// Maps each [`Platform`] to its injected capability.
#[derive(Clone, Default)]
pub struct PlatformDispatcher {
    capabilities: BTreeMap<Platform, Arc<dyn PlatformCapability>>,
}

impl PlatformDispatcher {
    /// Creates a dispatcher with no capabilities.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capabilities: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the capability for `platform`.
    #[must_use]
    pub fn with_capability(
        mut self,
        platform: Platform,
        capability: Arc<dyn PlatformCapability>,
    ) -> Self {
        self.capabilities.insert(platform, capability);
        self
    }

    /// Returns the platforms with a registered capability.
    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.capabilities.keys().copied()
    }

    /// Resolves a free-form platform type to its capability.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownPlatform`] when no platform token
    /// occurs in `platform_type`, or [`DispatchError::Unregistered`] when
    /// the resolved platform has no capability.
    pub fn resolve(
        &self,
        platform_type: &str,
    ) -> Result<Arc<dyn PlatformCapability>, DispatchError> {
        let platform = Platform::resolve(platform_type)?;
        self.capabilities
            .get(&platform)
            .cloned()
            .ok_or(DispatchError::Unregistered(platform))
    }
}

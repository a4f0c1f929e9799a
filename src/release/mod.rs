//! Mini-program publish and preview runs.
//!
//! A run fetches a project's source into a working directory, installs its
//! dependencies, builds it and hands the result to the platform tooling,
//! either to upload a release (publish) or to render a preview QR code
//! (preview). Every stage transition is journaled and pushed to
//! subscribers. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

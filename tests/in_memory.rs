//! In-memory run integration tests.
//!
//! Tests are organized into modules by run kind:
//! - `publish_flow_tests`: Publish stages, persistence and confirmation
//! - `preview_flow_tests`: Preview stages, pushes and QR embedding

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

mod in_memory {
    pub mod helpers;

    mod preview_flow_tests;
    mod publish_flow_tests;
}

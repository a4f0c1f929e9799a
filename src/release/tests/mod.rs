//! Unit tests for the release module.
//!
//! Tests are organised by component: the domain model and journal, the
//! bounded fetch, the build sequence, platform dispatch and the two run
//! flows of the orchestrator.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

mod concurrency_tests;
mod dispatch_tests;
pub(super) mod support;

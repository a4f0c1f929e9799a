//! Adapter implementations of the release ports.
//!
//! - [`memory`]: thread-safe in-memory adapters for tests and local runs
//! - [`process`]: adapters that shell out to git, curl, npm and the vendor
//!   tooling
//! - [`TracingNotificationChannel`]: a notification channel that writes
//!   snapshots to the log

pub mod memory;
pub mod process;

mod tracing_channel;

pub use tracing_channel::TracingNotificationChannel;

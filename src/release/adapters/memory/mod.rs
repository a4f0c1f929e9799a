//! In-memory adapter implementations.
//!
//! These adapters keep their state behind locks and record every call, so
//! tests can script collaborator behaviour and inspect what a run did.

mod capability;
mod command;
mod fetcher;
mod notification;
mod task_store;

pub use capability::StaticCapability;
pub use command::ScriptedCommandRunner;
pub use fetcher::StaticSourceFetcher;
pub use notification::{Notification, RecordingNotificationChannel};
pub use task_store::InMemoryTaskStore;

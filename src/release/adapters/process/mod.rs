//! Adapters backed by child processes.
//!
//! Every command runs in its own process group. Dropping a pending call
//! (for example when a fetch deadline elapses) kills the shell and every
//! program it started.

mod capability;
mod fetcher;
mod group;
mod shell;

pub use capability::CommandCapability;
pub use fetcher::ProcessSourceFetcher;
pub use shell::ShellCommandRunner;

/// Quotes `value` as a single POSIX shell word.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

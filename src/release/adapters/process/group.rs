//! Process-group cleanup for shell commands.

use tokio::process::Child;

/// Kills a child's whole process group if dropped before being released.
///
/// `kill_on_drop` reaches only the `sh` process; the programs it starts
/// (`curl`, `tar`, `npm`) share its group and are killed here.
#[derive(Debug)]
pub(super) struct ProcessGroupGuard {
    leader: Option<i32>,
}

impl ProcessGroupGuard {
    /// Guards the group led by `child`, which must have been spawned with
    /// `process_group(0)`.
    pub(super) fn new(child: &Child) -> Self {
        Self {
            leader: child.id().and_then(|id| i32::try_from(id).ok()),
        }
    }

    /// Leaves the group alone once the leader has exited on its own.
    pub(super) fn release(mut self) {
        self.leader = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(leader) = self.leader.take() {
            kill_group(leader);
        }
    }
}

#[cfg(unix)]
fn kill_group(leader: i32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Err(err) = killpg(Pid::from_raw(leader), Signal::SIGKILL) {
        tracing::debug!(pgid = leader, error = %err, "process group already gone");
    }
}

#[cfg(not(unix))]
const fn kill_group(_leader: i32) {}

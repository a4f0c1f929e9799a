//! Shell command runner built on `tokio::process`.
//!
//! Each command leads its own process group. Dropping a pending run kills
//! the whole group, including programs the shell started.

use async_trait::async_trait;
use camino::Utf8Path;
use std::process::Stdio;
use tokio::process::Command;

use super::group::ProcessGroupGuard;
use crate::release::ports::{CommandError, CommandOutput, CommandResult, CommandRunner};

/// Runs commands through `sh -c` and captures their output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    /// Creates a shell command runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run_with_env(
        &self,
        command: &str,
        working_dir: &Utf8Path,
        env: &[(String, String)],
    ) -> CommandResult<CommandOutput> {
        tracing::debug!(
            command,
            cwd = %working_dir,
            env = ?env.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            "running shell command"
        );
        let mut shell = std::process::Command::new("sh");
        shell
            .arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .envs(env.iter().map(|(name, value)| (name.as_str(), value.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut shell, 0);

        let child = Command::from(shell)
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| CommandError::spawn(command, err))?;
        let group = ProcessGroupGuard::new(&child);
        let output = child
            .wait_with_output()
            .await
            .map_err(|err| CommandError::wait(command, err))?;
        group.release();

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if output.status.success() {
            return Ok(captured);
        }

        let detail = if captured.stderr.trim().is_empty() {
            captured.stdout.trim()
        } else {
            captured.stderr.trim()
        };
        Err(CommandError::Failed {
            command: command.to_owned(),
            code: output.status.code(),
            detail: detail.to_owned(),
        })
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
mod tests {
    use super::ShellCommandRunner;
    use crate::release::ports::{CommandError, CommandRunner};
    use camino::Utf8PathBuf;
    use rstest::rstest;

    fn current_dir() -> Utf8PathBuf {
        Utf8PathBuf::from(".")
    }

    #[cfg(target_os = "linux")]
    fn scratch_dir() -> Utf8PathBuf {
        let base = Utf8PathBuf::from_path_buf(std::env::temp_dir()).expect("utf-8 temp dir");
        let dir = base
            .join("miniship-shell")
            .join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn captures_stdout_of_successful_commands() {
        let output = ShellCommandRunner::new()
            .run("printf 'one\\ntwo\\n'", &current_dir())
            .await
            .expect("printf should succeed");

        assert_eq!(output.last_stdout_line(), Some("two"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn reports_exit_status_and_stderr_of_failures() {
        let err = ShellCommandRunner::new()
            .run("echo broken >&2; exit 3", &current_dir())
            .await
            .expect_err("command should fail");

        match err {
            CommandError::Failed { code, detail, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(detail, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn passes_environment_without_touching_the_command() {
        let env = vec![("MINISHIP_TEST_VALUE".to_owned(), "hidden".to_owned())];

        let output = ShellCommandRunner::new()
            .run_with_env("printf '%s' \"$MINISHIP_TEST_VALUE\"", &current_dir(), &env)
            .await
            .expect("printf should succeed");

        assert_eq!(output.stdout, "hidden");
    }

    #[cfg(target_os = "linux")]
    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn dropping_a_pending_run_kills_programs_started_by_the_shell() {
        use crate::release::tests::support::wait_for_exit;
        use std::time::Duration;

        let dir = scratch_dir();
        let runner = ShellCommandRunner::new();
        let pending = runner.run("sleep 30 & echo $! > sleeper.pid; wait", &dir);

        let outcome = tokio::time::timeout(Duration::from_millis(500), pending).await;

        assert!(outcome.is_err(), "run should still be pending");
        let pid = std::fs::read_to_string(dir.join("sleeper.pid")).expect("pid file");
        let pid: u32 = pid.trim().parse().expect("numeric pid");
        assert!(
            wait_for_exit(pid, Duration::from_secs(2)).await,
            "background sleep {pid} survived the dropped run"
        );
    }
}

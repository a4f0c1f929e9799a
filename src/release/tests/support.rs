//! Shared fixtures for release unit tests.

use crate::config::{CiConfig, PlatformCommandConfig, TargetConfig};
use crate::release::domain::Platform;
use camino::Utf8PathBuf;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Clock that advances by a fixed step on every UTC reading.
#[derive(Debug)]
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            now: Mutex::new(start),
            step,
        }
    }

    pub fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0)
            .single()
            .expect("valid start instant")
    }

    /// Steps 1.5 s per reading from [`SteppingClock::start`].
    pub fn standard() -> Self {
        Self::new(Self::start(), TimeDelta::milliseconds(1_500))
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        let now = *self.now.lock().expect("clock lock");
        now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.now.lock().expect("clock lock");
        let current = *now;
        *now = current + self.step;
        current
    }
}

/// Creates an empty, unique workspace root under the system temp dir.
pub fn workspace_root() -> Utf8PathBuf {
    let base = Utf8PathBuf::from_path_buf(std::env::temp_dir()).expect("utf-8 temp dir");
    base.join("miniship-unit").join(uuid::Uuid::new_v4().to_string())
}

/// Configuration with one target per platform family.
pub fn config(workspace_root: Utf8PathBuf) -> CiConfig {
    let commands = PlatformCommandConfig {
        upload_command: "upload".to_owned(),
        preview_command: "preview".to_owned(),
    };
    CiConfig::new(workspace_root)
        .with_target(
            "wechat-mini",
            TargetConfig::new("https://github.com/acme/wechat-mini.git", "npm run build:weapp"),
        )
        .with_target(
            "alipay-mini",
            TargetConfig::new(
                "https://git.acme.dev/api/v4/projects/7/repository/archive",
                "npm run build:alipay",
            )
            .with_private_token("secret"),
        )
        .with_target(
            "toutiao-mini",
            TargetConfig::new("https://git.acme.dev/archive", "npm run build:tt"),
        )
        .with_platform(Platform::Wechat, commands.clone())
        .with_platform(Platform::Alipay, commands.clone())
        .with_platform(Platform::Toutiao, commands)
}

/// Polls `/proc` until `pid` has exited (or is a zombie awaiting reaping).
///
/// Returns `false` when the process is still running after `limit`.
#[cfg(target_os = "linux")]
pub async fn wait_for_exit(pid: u32, limit: std::time::Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if !process_is_running(pid) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

#[cfg(target_os = "linux")]
fn process_is_running(pid: u32) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat")).is_ok_and(|stat| {
        let state = stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next());
        !matches!(state, None | Some('Z' | 'X'))
    })
}

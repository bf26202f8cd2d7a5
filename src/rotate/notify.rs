//! Side effects towards other processes: reload signals and notification commands.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::RotateError;

/// Hook fired after a run reaches SUCCESS or FAIL.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Start `command` through `sh -c` without waiting for it.
    ///
    /// The exit status is never observed; the runtime reaps the child once it
    /// exits, so the callback must fire inside a tokio runtime. An empty
    /// command yields a no-op.
    pub fn command(command: &str) -> Self {
        if command.trim().is_empty() {
            return Self::noop();
        }
        let command = command.to_string();
        Self::new(move || spawn_detached(&command))
    }

    pub fn fire(&self) {
        (self.0)()
    }
}

impl Default for Callback {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

fn spawn_detached(command: &str) {
    match tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .spawn()
    {
        Ok(child) => debug!(command, pid = ?child.id(), "notification command started"),
        Err(e) => warn!(command, error = %e, "failed to start notification command"),
    }
}

/// Read the pid file and ask that process to reopen its logs with SIGHUP.
pub async fn signal_reload(pid_file: &Path) -> Result<i32, RotateError> {
    let raw = tokio::fs::read_to_string(pid_file)
        .await
        .map_err(|source| RotateError::PidFile {
            path: pid_file.to_path_buf(),
            source,
        })?;

    let pid = parse_pid(&raw).ok_or_else(|| RotateError::InvalidPid {
        path: pid_file.to_path_buf(),
        value: raw.trim_end_matches('\n').to_string(),
    })?;

    send_hangup(pid)?;
    debug!(pid, pid_file = %pid_file.display(), "reload signal delivered");
    Ok(pid)
}

fn parse_pid(raw: &str) -> Option<i32> {
    raw.trim_end_matches('\n')
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|pid| *pid > 0)
}

#[cfg(unix)]
fn send_hangup(pid: i32) -> Result<(), RotateError> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid), Signal::SIGHUP).map_err(|source| RotateError::Signal { pid, source })
}

#[cfg(not(unix))]
fn send_hangup(pid: i32) -> Result<(), RotateError> {
    Err(RotateError::SignalUnsupported { pid })
}

//! Child process handle and stop signals.

use std::process::Child;
use std::sync::Mutex;

use tracing::{debug, warn};

use super::result::exit_code;
use crate::error::ShellPagerError;
use crate::Result;

/// Operations the supervisor needs from a running process.
///
/// `kill` and `terminate` are idempotent and never fail: signalling a
/// process that already exited is a no-op.
pub trait ProcessHandle: Send + Sync {
    /// OS process id, if known.
    fn id(&self) -> Option<u32>;

    /// Send the forceful stop signal (SIGKILL).
    fn kill(&self);

    /// Send the polite stop signal (SIGTERM).
    fn terminate(&self);

    /// Exit code if the process has exited, without blocking.
    fn try_wait(&self) -> Result<Option<i32>>;
}

/// A spawned OS process.
#[derive(Debug)]
pub struct ChildProcess {
    child: Mutex<Child>,
    pid: u32,
}

impl ChildProcess {
    /// Wrap a spawned child. Its pipes should already be taken.
    pub fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: Mutex::new(child),
            pid,
        }
    }

    /// Lock the child unless it has already been reaped.
    fn with_running(&self, op: impl FnOnce(&mut Child)) {
        let Ok(mut child) = self.child.lock() else {
            warn!(pid = self.pid, "process lock poisoned, signal dropped");
            return;
        };
        match child.try_wait() {
            Ok(Some(_)) => debug!(pid = self.pid, "process already exited"),
            _ => op(&mut child),
        }
    }
}

impl ProcessHandle for ChildProcess {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn kill(&self) {
        self.with_running(|child| {
            if let Err(e) = child.kill() {
                debug!(pid = self.pid, "kill failed: {}", e);
            }
        });
    }

    fn terminate(&self) {
        self.with_running(|child| {
            #[cfg(unix)]
            {
                use nix::sys::signal::{kill, Signal};
                use nix::unistd::Pid;

                let pid = Pid::from_raw(i32::try_from(child.id()).unwrap_or(i32::MAX));
                if let Err(e) = kill(pid, Signal::SIGTERM) {
                    debug!(pid = self.pid, "terminate failed: {}", e);
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = child.kill() {
                    debug!(pid = self.pid, "terminate failed: {}", e);
                }
            }
        });
    }

    fn try_wait(&self) -> Result<Option<i32>> {
        let mut child = self
            .child
            .lock()
            .map_err(|_| ShellPagerError::LockPoisoned)?;
        Ok(child.try_wait()?.map(exit_code))
    }
}

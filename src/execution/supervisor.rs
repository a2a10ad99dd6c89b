//! Process supervisor: spawn, stream, stop and reap one command.

use std::io::Read;
use std::process::ChildStdin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::command::ExecutionTarget;
use super::drainer::{DrainTracker, StreamDrainer};
use super::process::{ChildProcess, ProcessHandle};
use super::result::OutputSource;
use super::stream::{OutputStream, DEFAULT_IDLE_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::error::ShellPagerError;
use crate::Result;

/// Interval between exit checks while waiting for a stopped process.
const REAP_POLL: Duration = Duration::from_millis(10);

/// Settings for starting executions.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Argv prefix the command is appended to.
    pub target: ExecutionTarget,
    /// Lines buffered between the drainers and the consumer.
    pub queue_capacity: usize,
    /// Silence tolerated before the output stream gives up.
    pub idle_timeout: Duration,
    /// Poll interval of the output stream.
    pub poll_interval: Duration,
    /// How long shutdown waits for the process to exit.
    pub wait_timeout: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            target: ExecutionTarget::default(),
            queue_capacity: 250,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// One running command and everything needed to stop it.
///
/// Call [`Execution::shutdown`] on every exit path. If an execution is
/// dropped without it, both stop signals are still sent and the drop
/// blocks for up to the wait timeout reaping the process.
pub struct Execution {
    command: String,
    process: Box<dyn ProcessHandle>,
    drains: DrainTracker,
    output: Option<OutputStream>,
    exit_code: Option<i32>,
    wait_timeout: Duration,
    _stdin: Option<ChildStdin>,
    shut_down: bool,
}

impl Execution {
    /// Spawn `command` inside the configured target and start draining.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(config: &ExecutionConfig, command: &str) -> Result<Self> {
        let mut child = config
            .target
            .command_for(command)
            .spawn()
            .map_err(ShellPagerError::Spawn)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let process = ChildProcess::new(child);
        info!(pid = ?process.id(), command, "process started");

        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            process.kill();
            return Err(ShellPagerError::Spawn(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "child output pipes unavailable",
            )));
        };

        let mut execution = Self::from_parts(command, Box::new(process), stdout, stderr, config);
        execution._stdin = stdin;
        Ok(execution)
    }

    /// Assemble an execution from an already running process and its pipes.
    pub fn from_parts<O, E>(
        command: &str,
        process: Box<dyn ProcessHandle>,
        stdout: O,
        stderr: E,
        config: &ExecutionConfig,
    ) -> Self
    where
        O: Read + Send + 'static,
        E: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let drains = DrainTracker::new(2);

        StreamDrainer::new(stdout, OutputSource::Stdout, tx.clone()).spawn(drains.clone());
        StreamDrainer::new(stderr, OutputSource::Stderr, tx).spawn(drains.clone());

        let output = OutputStream::new(
            rx,
            drains.clone(),
            config.idle_timeout,
            config.poll_interval,
        );

        Self {
            command: command.to_string(),
            process,
            drains,
            output: Some(output),
            exit_code: None,
            wait_timeout: config.wait_timeout,
            _stdin: None,
            shut_down: false,
        }
    }

    /// The user command, without the target prefix.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// OS process id, if known.
    pub fn pid(&self) -> Option<u32> {
        self.process.id()
    }

    /// True once both output pipes reached EOF.
    pub fn is_closed(&self) -> bool {
        self.drains.is_closed()
    }

    /// Handle for observing pipe closure after the execution moves.
    pub fn drains(&self) -> DrainTracker {
        self.drains.clone()
    }

    /// Take the output stream. Only the first call succeeds.
    pub fn take_output(&mut self) -> Result<OutputStream> {
        self.output.take().ok_or(ShellPagerError::OutputTaken)
    }

    /// Exit code, once the process has been reaped.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Send SIGKILL. No-op if the process already exited.
    pub fn kill(&self) {
        debug!(pid = ?self.pid(), "kill requested");
        self.process.kill();
    }

    /// Send SIGTERM. No-op if the process already exited.
    pub fn terminate(&self) {
        debug!(pid = ?self.pid(), "terminate requested");
        self.process.terminate();
    }

    /// Stop the process and wait for its exit code.
    ///
    /// Sends kill then terminate, then waits up to the configured wait
    /// timeout. A process that survives that is reported as
    /// [`ShellPagerError::ProcessUnresponsive`].
    pub async fn shutdown(&mut self) -> Result<i32> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        self.shut_down = true;

        self.process.kill();
        self.process.terminate();

        let deadline = Instant::now() + self.wait_timeout;
        loop {
            if let Some(code) = self.process.try_wait()? {
                info!(pid = ?self.pid(), code, "process exited");
                self.exit_code = Some(code);
                return Ok(code);
            }
            if Instant::now() >= deadline {
                warn!(pid = ?self.pid(), "process survived kill and terminate");
                return Err(ShellPagerError::ProcessUnresponsive {
                    pid: self.pid(),
                    waited: self.wait_timeout,
                });
            }
            tokio::time::sleep(REAP_POLL).await;
        }
    }
}

impl Drop for Execution {
    /// Fallback for executions dropped without [`Execution::shutdown`].
    ///
    /// Sends both stop signals and blocks the dropping thread for at most
    /// the wait timeout while reaping.
    fn drop(&mut self) {
        if self.shut_down || self.exit_code.is_some() {
            return;
        }
        warn!(pid = ?self.pid(), "execution dropped without shutdown, stopping process");
        self.process.kill();
        self.process.terminate();

        let deadline = std::time::Instant::now() + self.wait_timeout;
        loop {
            match self.process.try_wait() {
                Ok(Some(code)) => {
                    info!(pid = ?self.pid(), code, "process exited");
                    return;
                }
                Ok(None) => {}
                Err(e) => {
                    error!(pid = ?self.pid(), "failed to reap dropped process: {}", e);
                    return;
                }
            }
            if std::time::Instant::now() >= deadline {
                error!(
                    pid = ?self.pid(),
                    waited = ?self.wait_timeout,
                    "dropped process survived kill and terminate"
                );
                return;
            }
            std::thread::sleep(REAP_POLL);
        }
    }
}

//! Error types for shell-pager.

use std::time::Duration;

use thiserror::Error;

use crate::session::DisplayError;

/// Main error type for shell-pager operations.
#[derive(Error, Debug)]
pub enum ShellPagerError {
    /// The child process could not be started.
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    /// The execution target template has no program to run.
    #[error("execution target is empty")]
    InvalidTarget,

    /// The process produced no output for the configured idle timeout.
    #[error("process produced no output for {}s", .0.as_secs())]
    IdleTimeout(Duration),

    /// Kill and terminate were sent but the process did not exit in time.
    #[error("process {pid:?} did not exit within {}s of being killed", waited.as_secs())]
    ProcessUnresponsive { pid: Option<u32>, waited: Duration },

    /// The output stream of an execution was already taken.
    #[error("output stream already taken")]
    OutputTaken,

    /// Display surface failure that could not be absorbed.
    #[error("display error: {0}")]
    Display(#[from] DisplayError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for shell-pager operations.
pub type Result<T> = std::result::Result<T, ShellPagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ShellPagerError::Spawn(io_err);
        assert!(err.to_string().contains("failed to spawn"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_idle_timeout_display() {
        let err = ShellPagerError::IdleTimeout(Duration::from_secs(120));
        assert_eq!(err.to_string(), "process produced no output for 120s");
    }

    #[test]
    fn test_unresponsive_display() {
        let err = ShellPagerError::ProcessUnresponsive {
            pid: Some(42),
            waited: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ShellPagerError = io_err.into();
        assert!(matches!(err, ShellPagerError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_display_error_conversion() {
        let err: ShellPagerError = DisplayError::Other("rate limited".into()).into();
        assert!(matches!(err, ShellPagerError::Display(_)));
        assert!(err.to_string().contains("rate limited"));
    }
}

//! Pull-based output sequence with an idle timeout.

use std::time::Duration;

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;

use super::drainer::DrainTracker;
use super::result::OutputItem;
use crate::error::ShellPagerError;
use crate::Result;

/// Default silence tolerated from a running process.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default interval between queue polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Output of one execution, in arrival order across both pipes.
///
/// Short polls let the stream notice completion promptly; the idle
/// timeout is only checked when a poll comes back empty.
pub struct OutputStream {
    rx: mpsc::Receiver<OutputItem>,
    drains: DrainTracker,
    idle_timeout: Duration,
    poll_interval: Duration,
    last_item_at: Instant,
}

impl OutputStream {
    /// Create a stream over the drainers' queue.
    pub fn new(
        rx: mpsc::Receiver<OutputItem>,
        drains: DrainTracker,
        idle_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            rx,
            drains,
            idle_timeout,
            poll_interval,
            last_item_at: Instant::now(),
        }
    }

    /// Next line, `None` once the process closed its pipes and the queue
    /// is drained, or [`ShellPagerError::IdleTimeout`] after `idle_timeout`
    /// without a line.
    ///
    /// Cancel safe: dropping the future never loses a queued item.
    pub async fn next(&mut self) -> Option<Result<OutputItem>> {
        loop {
            match tokio::time::timeout(self.poll_interval, self.rx.recv()).await {
                Ok(Some(item)) => {
                    self.last_item_at = Instant::now();
                    return Some(Ok(item));
                }
                Ok(None) => return None,
                Err(_) => {
                    if self.last_item_at.elapsed() >= self.idle_timeout {
                        warn!(
                            closed = self.drains.is_closed(),
                            "no output for {:?}, giving up", self.idle_timeout
                        );
                        return Some(Err(ShellPagerError::IdleTimeout(self.idle_timeout)));
                    }
                }
            }
        }
    }

    /// True once both pipes reached EOF.
    pub fn is_closed(&self) -> bool {
        self.drains.is_closed()
    }

    /// Adapt into a `futures` stream that ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<OutputItem>> {
        futures_util::stream::unfold(Some(self), |state| async move {
            let mut stream = state?;
            match stream.next().await? {
                Ok(item) => Some((Ok(item), Some(stream))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

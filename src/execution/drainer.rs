//! Line drainers for the child's output pipes.
//!
//! Pipe reads block, so each drainer runs its read loop on a blocking
//! thread and hands finished lines to the async side through a bounded
//! channel. A full channel blocks the drainer, which in turn stalls the
//! process on its next write instead of buffering without limit.

use std::io::{BufRead, BufReader, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use super::result::{OutputItem, OutputSource};
use crate::output::OutputSanitizer;

/// Tracks how many drainers are still reading.
#[derive(Debug, Clone)]
pub struct DrainTracker {
    open: Arc<AtomicUsize>,
}

impl DrainTracker {
    /// Track `count` drainers.
    pub fn new(count: usize) -> Self {
        Self {
            open: Arc::new(AtomicUsize::new(count)),
        }
    }

    /// Record that one drainer finished.
    pub fn finish(&self) {
        let _ = self
            .open
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    /// True once every drainer has finished.
    pub fn is_closed(&self) -> bool {
        self.open.load(Ordering::Acquire) == 0
    }
}

/// Turn one raw line into display-safe text.
///
/// Undecodable bytes become U+FFFD, carriage returns are dropped,
/// double backticks are broken with a zero-width space so they cannot
/// close a code fence, and one trailing newline is removed.
pub fn clean_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw)
        .replace('\r', "")
        .replace("``", "`\u{200b}`");
    let mut text = OutputSanitizer::strip_control(&text).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Reads one pipe to end of stream, line by line.
pub struct StreamDrainer<R: Read + Send + 'static> {
    reader: R,
    source: OutputSource,
    tx: mpsc::Sender<OutputItem>,
}

impl<R: Read + Send + 'static> StreamDrainer<R> {
    /// Create a drainer feeding `tx`.
    pub fn new(reader: R, source: OutputSource, tx: mpsc::Sender<OutputItem>) -> Self {
        Self { reader, source, tx }
    }

    /// Spawn the drainer, marking `tracker` when it finishes.
    pub fn spawn(self, tracker: DrainTracker) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
            tracker.finish();
        })
    }

    /// Read until EOF, a read error, or the receiver going away.
    pub async fn run(self) {
        let source = self.source;
        let reader = self.reader;
        let tx = self.tx;

        let result = tokio::task::spawn_blocking(move || {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => {
                        debug!(stream = source.as_str(), "drainer: EOF");
                        break;
                    }
                    Ok(n) => {
                        trace!(stream = source.as_str(), "drainer: read {} bytes", n);
                        let item = OutputItem::new(source, clean_line(&buf));
                        if tx.blocking_send(item).is_err() {
                            debug!(stream = source.as_str(), "drainer: channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        error!(stream = source.as_str(), "drainer read error: {}", e);
                        break;
                    }
                }
            }
        })
        .await;

        if let Err(e) = result {
            error!(stream = source.as_str(), "drainer task panicked: {}", e);
        }
    }
}

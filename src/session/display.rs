//! The external surface pages are rendered onto.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use super::controls::Controls;
use super::id::ActorId;

/// Failure reported by a display surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// The message being edited no longer exists.
    #[error("display message no longer exists")]
    Gone,
    /// Any other failure, such as a rejected edit.
    #[error("{0}")]
    Other(String),
}

/// What one render shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Full message text, decoration included.
    pub content: String,
    /// Button states.
    pub controls: Controls,
}

/// A size-limited message with buttons, e.g. a chat message.
#[async_trait]
pub trait DisplaySurface: Send + Sync {
    /// Replace the displayed message with `view`.
    async fn render(&self, view: &View) -> Result<(), DisplayError>;

    /// Show `message` to `actor` only, without touching the display.
    async fn notify(&self, actor: ActorId, message: &str) -> Result<(), DisplayError>;
}

/// Shared handle to a surface that goes quiet once the surface is gone.
#[derive(Clone)]
pub struct RenderTarget {
    surface: Arc<dyn DisplaySurface>,
    gone: Arc<AtomicBool>,
}

impl RenderTarget {
    /// Wrap a surface.
    pub fn new(surface: Arc<dyn DisplaySurface>) -> Self {
        Self {
            surface,
            gone: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the surface reported its message gone.
    pub fn is_gone(&self) -> bool {
        self.gone.load(Ordering::Acquire)
    }

    /// Render `view`, absorbing failures.
    ///
    /// [`DisplayError::Gone`] detaches the target and later renders are
    /// skipped. Other errors are logged and returned.
    pub async fn render(&self, view: &View) -> Result<(), DisplayError> {
        if self.is_gone() {
            return Ok(());
        }
        match self.surface.render(view).await {
            Err(DisplayError::Gone) => {
                info!("display message gone, continuing headless");
                self.gone.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                warn!("render failed: {}", e);
                Err(e)
            }
            Ok(()) => Ok(()),
        }
    }

    /// Send a private notice, logging failures.
    pub async fn notify(&self, actor: ActorId, message: &str) {
        if let Err(e) = self.surface.notify(actor, message).await {
            warn!(%actor, "notice failed: {}", e);
        }
    }
}

//! Display sessions.
//!
//! This module ties a running command to a size-limited display:
//! - Identifiers for sessions and the actors pressing controls
//! - Navigation state and control enablement
//! - Debounced rendering onto a [`DisplaySurface`]
//! - The loop that streams output and answers interactions

mod controls;
mod debounce;
mod display;
mod id;
mod navigation;
mod runner;

pub use controls::{Control, ControlInputs, Controls, UnknownControl};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use display::{DisplayError, DisplaySurface, RenderTarget, View};
pub use id::{ActorId, SessionId};
pub use navigation::Navigation;
pub use runner::{
    drive, drive_until, run_shell, run_shell_until, DisplaySession, Interaction,
    InteractionOutcome, SessionConfig, SessionReport, ShellRequest, DEFAULT_SESSION_TIMEOUT,
    PLACEHOLDER, UNAUTHORIZED_NOTICE,
};

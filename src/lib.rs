//! # shell-pager
//!
//! Run a shell command and page its live output onto a size-limited
//! display with navigation and stop controls.
//!
//! This crate spawns a command inside an execution target (by default a
//! sandbox container), drains stdout and stderr concurrently, splits the
//! output into pages that fit a message size limit, and keeps a display
//! surface updated while the process runs.
//!
//! ## Features
//!
//! - **Bounded streaming**: Backpressured line queue with an idle timeout
//! - **Pagination**: Newline, space and hard splits within a page budget
//! - **Live display**: Debounced updates with first/back/forward/last paging
//! - **Process control**: Kill and terminate buttons, bounded teardown
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use shell_pager::console::{ConsoleSurface, LOCAL_ACTOR};
//! use shell_pager::execution::{ExecutionConfig, ExecutionTarget};
//! use shell_pager::session::{run_shell, SessionConfig, ShellRequest};
//!
//! #[tokio::main]
//! async fn main() -> shell_pager::Result<()> {
//!     shell_pager::logging::try_init("info").ok();
//!
//!     let execution = ExecutionConfig {
//!         target: ExecutionTarget::local_shell(),
//!         ..ExecutionConfig::default()
//!     };
//!     let request = ShellRequest::new(LOCAL_ACTOR, "ls -la");
//!     let (_controls, interactions) = tokio::sync::mpsc::channel(8);
//!
//!     let report = run_shell(
//!         &request,
//!         &execution,
//!         &SessionConfig::default(),
//!         Arc::new(ConsoleSurface::stdout()),
//!         interactions,
//!     )
//!     .await?;
//!
//!     println!("exited with {} after {} pages", report.exit_code, report.pages);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod execution;
pub mod logging;
pub mod output;
pub mod session;

// Re-export commonly used types
pub use error::{Result, ShellPagerError};
pub use execution::{Execution, ExecutionConfig, ExecutionTarget, OutputItem, OutputSource};
pub use output::{OutputSanitizer, PageLayout, Paginator};
pub use session::{
    run_shell, ActorId, Control, DisplaySurface, Interaction, SessionConfig, SessionId,
    SessionReport, ShellRequest, View,
};

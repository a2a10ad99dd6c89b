//! Command execution and output streaming.
//!
//! This module provides the process side of a paged shell session:
//! - Spawning a command inside an execution target
//! - Draining stdout and stderr concurrently with backpressure
//! - An output stream with an idle timeout
//! - Bounded teardown (kill, terminate, wait)
//!
//! # Example
//!
//! ```no_run
//! use shell_pager::execution::{Execution, ExecutionConfig, ExecutionTarget};
//!
//! # async fn demo() -> shell_pager::Result<()> {
//! let config = ExecutionConfig {
//!     target: ExecutionTarget::local_shell(),
//!     ..ExecutionConfig::default()
//! };
//! let mut execution = Execution::start(&config, "echo hello")?;
//! let mut output = execution.take_output()?;
//! while let Some(item) = output.next().await {
//!     println!("{}", item?.text);
//! }
//! let code = execution.shutdown().await?;
//! # let _ = code;
//! # Ok(())
//! # }
//! ```

mod command;
mod drainer;
mod process;
mod result;
mod stream;
mod supervisor;

pub use command::{ExecutionTarget, DEFAULT_CONTAINER};
pub use drainer::{clean_line, DrainTracker, StreamDrainer};
pub use process::{ChildProcess, ProcessHandle};
pub use result::{exit_code, OutputItem, OutputSource};
pub use stream::{OutputStream, DEFAULT_IDLE_TIMEOUT, DEFAULT_POLL_INTERVAL};
pub use supervisor::{Execution, ExecutionConfig};

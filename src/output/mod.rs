//! Output processing for the paged display.
//!
//! This module provides tools for turning raw process output into pages:
//! - Control sequence stripping that keeps SGR colors
//! - Capacity-bounded pagination with natural break points
//!
//! # Example
//!
//! ```
//! use shell_pager::output::{OutputSanitizer, PageLayout, Paginator};
//!
//! let clean = OutputSanitizer::strip_control("\x1b[2J\x1b[31mred\x1b[0m");
//! assert_eq!(clean, "\x1b[31mred\x1b[0m");
//!
//! let mut pages = Paginator::new(PageLayout::default());
//! pages.add_fragment("hello");
//! assert_eq!(pages.page(0), Some("hello"));
//! ```

mod paginator;
mod sanitizer;

pub use paginator::{PageLayout, Paginator};
pub use sanitizer::OutputSanitizer;

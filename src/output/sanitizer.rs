//! Output sanitization for control sequences that break a line view.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// CSI sequences of the form `ESC [ ?digits letter` or `ESC [ digits ; digits f|H`.
const CSI_PATTERN: &str = r"\x1b\[\??(\d*)(?:([ABCDEFGJKSThilmnsu])|;(\d+)([fH]))";

fn csi_regex() -> &'static Regex {
    static CSI: OnceLock<Regex> = OnceLock::new();
    CSI.get_or_init(|| Regex::new(CSI_PATTERN).expect("CSI pattern is valid"))
}

/// Output sanitizer that keeps colors and drops cursor/screen control.
pub struct OutputSanitizer;

impl OutputSanitizer {
    /// Remove cursor movement, erase and mode sequences from a line.
    ///
    /// SGR sequences (final byte `m`) pass through untouched so an
    /// ANSI-capable renderer can still show colors.
    pub fn strip_control(input: &str) -> Cow<'_, str> {
        csi_regex().replace_all(input, |caps: &Captures<'_>| {
            if caps.get(2).is_some_and(|m| m.as_str() == "m") {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
    }
}

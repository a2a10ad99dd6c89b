//! Output items flowing from the drainers to the display.

use std::process::ExitStatus;

/// Stream an output line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl OutputSource {
    /// Label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSource::Stdout => "stdout",
            OutputSource::Stderr => "stderr",
        }
    }
}

/// One sanitized line of process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem {
    /// Stream the line came from.
    pub source: OutputSource,
    /// Decoded text without its trailing newline.
    pub text: String,
}

impl OutputItem {
    /// Create a new output item.
    pub fn new(source: OutputSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }

    /// Create a stdout item.
    pub fn stdout(text: impl Into<String>) -> Self {
        Self::new(OutputSource::Stdout, text)
    }

    /// Create a stderr item.
    pub fn stderr(text: impl Into<String>) -> Self {
        Self::new(OutputSource::Stderr, text)
    }

    /// Text as shown on a page; stderr lines are marked.
    pub fn display_text(&self) -> String {
        match self.source {
            OutputSource::Stdout => self.text.clone(),
            OutputSource::Stderr => format!("[stderr] {}", self.text),
        }
    }
}

/// Numeric exit code; a signal-terminated process reports `-signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

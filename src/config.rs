//! Configuration management for shell-pager.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::{ExecutionConfig, ExecutionTarget};
use crate::output::PageLayout;
use crate::session::SessionConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Process execution settings.
    pub execution: ExecutionSection,
    /// Display and pagination settings.
    pub pager: PagerSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Execution configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Argv prefix the command is appended to.
    pub target: Vec<String>,
    /// Lines buffered between the pipe readers and the display.
    pub queue_capacity: usize,
    /// Seconds without output before the process is stopped.
    pub idle_timeout_secs: u64,
    /// Milliseconds between output queue polls.
    pub poll_interval_ms: u64,
    /// Seconds to wait for a stopped process to exit.
    pub wait_timeout_secs: u64,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            target: ExecutionTarget::default().template(),
            queue_capacity: 250,
            idle_timeout_secs: 120,
            poll_interval_ms: 1000,
            wait_timeout_secs: 120,
        }
    }
}

/// Pager configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerSection {
    /// Maximum size of one displayed message, in characters.
    pub max_size: usize,
    /// Line opening every page.
    pub prefix: String,
    /// Line closing every page.
    pub suffix: String,
    /// Milliseconds between output-driven display updates.
    pub debounce_ms: u64,
    /// Seconds of inactivity before controls are disabled.
    pub session_timeout_secs: u64,
}

impl Default for PagerSection {
    fn default() -> Self {
        let layout = PageLayout::default();
        Self {
            max_size: layout.max_size,
            prefix: layout.prefix,
            suffix: layout.suffix,
            debounce_ms: 1000,
            session_timeout_secs: 180,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(target) = std::env::var("SHELL_PAGER_TARGET") {
            let target = split_template(&target);
            if !target.is_empty() {
                self.execution.target = target;
            }
        }

        if let Ok(secs) = std::env::var("SHELL_PAGER_IDLE_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                self.execution.idle_timeout_secs = secs;
            }
        }

        if let Ok(level) = std::env::var("SHELL_PAGER_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if args.local {
            self.execution.target = ExecutionTarget::local_shell().template();
        } else if let Some(ref target) = args.target {
            self.execution.target = split_template(target);
        }

        if let Some(secs) = args.idle_timeout {
            self.execution.idle_timeout_secs = secs;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to the settings used to start processes.
    pub fn to_execution_config(&self) -> Result<ExecutionConfig, ConfigError> {
        let target = ExecutionTarget::new(self.execution.target.iter().cloned())
            .map_err(|_| ConfigError::InvalidTarget)?;

        Ok(ExecutionConfig {
            target,
            queue_capacity: self.execution.queue_capacity.max(1),
            idle_timeout: Duration::from_secs(self.execution.idle_timeout_secs),
            poll_interval: Duration::from_millis(self.execution.poll_interval_ms.max(1)),
            wait_timeout: Duration::from_secs(self.execution.wait_timeout_secs),
        })
    }

    /// Convert to the settings used by display sessions.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let layout = PageLayout::new(
            self.pager.max_size,
            self.pager.prefix.clone(),
            self.pager.suffix.clone(),
        );
        if layout.capacity() == 0 {
            return Err(ConfigError::InvalidPageSize(self.pager.max_size));
        }

        Ok(SessionConfig {
            layout,
            debounce: Duration::from_millis(self.pager.debounce_ms),
            session_timeout: Duration::from_secs(self.pager.session_timeout_secs),
        })
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Split a target template such as `"ssh box bash -c"` on whitespace.
pub fn split_template(template: &str) -> Vec<String> {
    template.split_whitespace().map(str::to_string).collect()
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Execution target has no program.
    InvalidTarget,
    /// Page size leaves no room for content.
    InvalidPageSize(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidTarget => write!(f, "execution target is empty"),
            Self::InvalidPageSize(size) => {
                write!(f, "page size {} leaves no room for content", size)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use shell_pager::cli::{parse_args_from, Args};
use shell_pager::config::{Config, ConfigError};
use shell_pager::ExecutionTarget;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("shell-pager")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.config.is_none());
    assert!(result.target.is_none());
    assert!(result.idle_timeout.is_none());
    assert!(!result.local);
    assert!(result.command_line().is_none());
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-t",
        "ssh build-box bash -c",
        "-i",
        "45",
        "-l",
        "debug",
        "make",
        "-j8",
        "test",
    ]))
    .unwrap();

    assert_eq!(result.target.as_deref(), Some("ssh build-box bash -c"));
    assert_eq!(result.idle_timeout, Some(45));
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert_eq!(result.command_line().as_deref(), Some("make -j8 test"));
}

#[test]
fn test_cli_config_file() {
    let result = parse_args_from(args(&["-c", "/etc/shell-pager.json", "uptime"])).unwrap();
    assert_eq!(
        result.config.as_deref(),
        Some(std::path::Path::new("/etc/shell-pager.json"))
    );
}

#[test]
fn test_cli_invalid_idle_timeout() {
    let result = parse_args_from(args(&["-i", "-5"]));
    assert!(result.is_err());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let json = r#"{
        "execution": {
            "target": ["bash", "-lc"],
            "queue_capacity": 10,
            "poll_interval_ms": 50
        },
        "pager": {
            "max_size": 500,
            "debounce_ms": 250,
            "session_timeout_secs": 60
        },
        "logging": {
            "level": "warn"
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();
    let execution = config.to_execution_config().unwrap();
    let session = config.to_session_config().unwrap();

    assert_eq!(execution.target, ExecutionTarget::new(["bash", "-lc"]).unwrap());
    assert_eq!(execution.queue_capacity, 10);
    assert_eq!(execution.poll_interval, Duration::from_millis(50));
    assert_eq!(session.layout.max_size, 500);
    assert_eq!(session.layout.prefix, "```ansi");
    assert_eq!(session.debounce, Duration::from_millis(250));
    assert_eq!(session.session_timeout, Duration::from_secs(60));
    assert_eq!(config.log_filter(), "warn");
}

#[test]
fn test_config_priority_cli_over_file() {
    let json = r#"{
        "execution": {
            "target": ["ssh", "far-away", "sh", "-c"],
            "idle_timeout_secs": 300
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let cli = Args {
        config: Some(file.path().to_path_buf()),
        local: true,
        idle_timeout: Some(10),
        ..Args::default()
    };

    let config = Config::load(&cli).unwrap();
    assert_eq!(config.execution.target, vec!["sh", "-c"]);
    assert_eq!(config.execution.idle_timeout_secs, 10);
}

#[test]
fn test_config_missing_file() {
    let cli = Args {
        config: Some("/nonexistent/shell-pager.json".into()),
        ..Args::default()
    };

    assert!(matches!(Config::load(&cli), Err(ConfigError::Io(_))));
}

#[test]
fn test_config_roundtrip() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.execution.target, config.execution.target);
    assert_eq!(parsed.pager.max_size, config.pager.max_size);
}

#[test]
fn test_config_partial_deserialization() {
    let parsed: Config = serde_json::from_str(r#"{"pager": {"suffix": "~~~"}}"#).unwrap();

    assert_eq!(parsed.pager.suffix, "~~~");
    assert_eq!(parsed.pager.prefix, "```ansi");
    assert_eq!(parsed.execution.queue_capacity, 250);
}

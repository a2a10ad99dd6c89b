//! Command-line interface for shell-pager.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Execution target template, split on whitespace.
    pub target: Option<String>,
    /// Run commands with the local `sh -c`.
    pub local: bool,
    /// Seconds without output before the process is stopped.
    pub idle_timeout: Option<u64>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Command words, joined with spaces.
    pub command: Vec<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Args {
    /// The command line to run, `None` if no words were given.
    pub fn command_line(&self) -> Option<String> {
        (!self.command.is_empty()).then(|| self.command.join(" "))
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("target") => {
                let value: String = parser.value()?.parse()?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidValue("target", value));
                }
                result.target = Some(value);
            }
            Long("local") => {
                result.local = true;
            }
            Short('i') | Long("idle-timeout") => {
                let value: String = parser.value()?.parse()?;
                let secs = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("idle-timeout", value))?;
                result.idle_timeout = Some(secs);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                result.command.push(val.string()?);
                for rest in parser.raw_args()? {
                    result
                        .command
                        .push(rest.into_string().map_err(lexopt::Error::from)?);
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shell-pager {version}
Run a shell command and page its live output

USAGE:
    shell-pager [OPTIONS] [--] <COMMAND>...

OPTIONS:
    -c, --config <FILE>         Path to configuration file (JSON)
    -t, --target <TEMPLATE>     Argv prefix the command is appended to
                                [default: docker exec -i evalbot_sandbox bash -c]
        --local                 Run with the local `sh -c`
    -i, --idle-timeout <SECS>   Stop the process after this long without output
    -l, --log-level <LVL>       Log level (error, warn, info, debug, trace)
    -h, --help                  Print help
    -V, --version               Print version

CONTROLS (one per line on stdin):
    start, back, forward, end   Move between pages
    kill, terminate             Stop the running process

ENVIRONMENT VARIABLES:
    SHELL_PAGER_TARGET          Target template (overrides config)
    SHELL_PAGER_IDLE_TIMEOUT    Idle timeout in seconds (overrides config)
    SHELL_PAGER_LOG_LEVEL       Log level (overrides config)
    RUST_LOG                    Alternative log level setting

EXAMPLES:
    # Run inside the default sandbox container
    shell-pager ls -la /

    # Run on this machine
    shell-pager --local -- 'for i in $(seq 100); do echo $i; sleep 1; done'

    # Run over ssh
    shell-pager -t 'ssh build-box bash -c' make test
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shell-pager {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

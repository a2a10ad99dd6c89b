//! Shell-pager binary entry point.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shell_pager::cli::{self, Args};
use shell_pager::config::Config;
use shell_pager::console::{parse_interaction, ConsoleSurface, LOCAL_ACTOR};
use shell_pager::logging;
use shell_pager::session::{run_shell_until, Interaction, ShellRequest};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'shell-pager --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("An unknown error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Some(command) = args.command_line() else {
        return Err("no command given".into());
    };

    let config = Config::load(&args)?;
    logging::init(config.log_filter());
    info!("shell-pager v{}", env!("CARGO_PKG_VERSION"));

    let execution = config.to_execution_config()?;
    let session = config.to_session_config()?;
    info!(argv = ?execution.target.template(), "using execution target");

    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("controls".into())
        .spawn(move || read_controls(tx))?;

    let request = ShellRequest::new(LOCAL_ACTOR, command);
    let surface = Arc::new(ConsoleSurface::stdout());

    let interrupted = AtomicBool::new(false);
    let cancel = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupted, stopping process");
                interrupted.store(true, Ordering::SeqCst);
            }
            Err(e) => {
                warn!("cannot listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let report = run_shell_until(&request, &execution, &session, surface, rx, cancel).await?;
    info!(session = %report.session, pages = report.pages, "done");
    if interrupted.load(Ordering::SeqCst) {
        return Ok(ExitCode::from(130));
    }
    Ok(exit_status(report.exit_code))
}

/// Forward stdin lines as control presses until stdin closes.
///
/// Runs on its own thread so a pending read never holds up exit.
fn read_controls(tx: mpsc::Sender<Interaction>) {
    for line in std::io::stdin().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read controls: {}", e);
                break;
            }
        };
        match parse_interaction(&line, LOCAL_ACTOR) {
            Some(Ok(interaction)) => {
                if tx.blocking_send(interaction).is_err() {
                    break;
                }
            }
            Some(Err(e)) => eprintln!("{}", e),
            None => {}
        }
    }
}

/// Shell-style exit status: signal deaths map to 128 + signal.
fn exit_status(code: i32) -> ExitCode {
    let status = if code < 0 { 128 - code } else { code };
    ExitCode::from(u8::try_from(status).unwrap_or(u8::MAX))
}

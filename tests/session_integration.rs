//! Session integration tests.
//!
//! These tests run real commands with the local `sh -c` and check what a
//! display surface receives.

#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use shell_pager::session::{
    run_shell, ActorId, Control, DisplayError, DisplaySurface, Interaction, SessionConfig,
    ShellRequest, View,
};
use shell_pager::{ExecutionConfig, ExecutionTarget, PageLayout, ShellPagerError};

const INVOKER: ActorId = ActorId(42);

/// Surface that keeps every rendered view.
#[derive(Default)]
struct Recorder {
    views: Mutex<Vec<View>>,
}

impl Recorder {
    fn last(&self) -> View {
        self.views.lock().unwrap().last().cloned().unwrap()
    }

    fn count(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

#[async_trait]
impl DisplaySurface for Recorder {
    async fn render(&self, view: &View) -> Result<(), DisplayError> {
        self.views.lock().unwrap().push(view.clone());
        Ok(())
    }

    async fn notify(&self, _actor: ActorId, _message: &str) -> Result<(), DisplayError> {
        Ok(())
    }
}

fn local(idle: Duration) -> ExecutionConfig {
    ExecutionConfig {
        target: ExecutionTarget::local_shell(),
        idle_timeout: idle,
        poll_interval: Duration::from_millis(20),
        wait_timeout: Duration::from_secs(5),
        ..ExecutionConfig::default()
    }
}

fn session() -> SessionConfig {
    SessionConfig {
        debounce: Duration::from_millis(50),
        session_timeout: Duration::from_secs(5),
        ..SessionConfig::default()
    }
}

fn no_controls() -> mpsc::Receiver<Interaction> {
    mpsc::channel(1).1
}

#[tokio::test]
async fn test_echo_hello() {
    let recorder = Arc::new(Recorder::default());
    let request = ShellRequest::new(INVOKER, "echo hello");

    let report = run_shell(
        &request,
        &local(Duration::from_secs(5)),
        &session(),
        recorder.clone(),
        no_controls(),
    )
    .await
    .unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.pages, 1);

    let last = recorder.last();
    assert_eq!(
        last.content,
        "```ansi\n$ echo hello\n\nhello\n\n$ [process exited with code 0]\n```"
    );
    assert_eq!(last.controls.enabled().count(), 0);
}

#[tokio::test]
async fn test_stderr_is_marked() {
    let recorder = Arc::new(Recorder::default());
    let request = ShellRequest::new(INVOKER, "echo oops >&2; exit 4");

    let report = run_shell(
        &request,
        &local(Duration::from_secs(5)),
        &session(),
        recorder.clone(),
        no_controls(),
    )
    .await
    .unwrap();

    assert_eq!(report.exit_code, 4);
    let content = recorder.last().content;
    assert!(content.contains("[stderr] oops"));
    assert!(content.contains("[process exited with code 4]"));
}

#[tokio::test]
async fn test_long_output_is_paged() {
    let recorder = Arc::new(Recorder::default());
    let request = ShellRequest::new(INVOKER, "seq 1 200");
    let config = SessionConfig {
        layout: PageLayout::new(120, "```", "```"),
        ..session()
    };

    let report = run_shell(
        &request,
        &local(Duration::from_secs(5)),
        &config,
        recorder.clone(),
        no_controls(),
    )
    .await
    .unwrap();

    assert!(report.pages > 1);
    for view in recorder.views.lock().unwrap().iter() {
        assert!(view.content.chars().count() <= 120);
    }
    assert!(recorder.last().content.contains("200"));
}

#[tokio::test]
async fn test_kill_control_stops_process() {
    let recorder = Arc::new(Recorder::default());
    let request = ShellRequest::new(INVOKER, "echo started; exec sleep 30");
    let (tx, rx) = mpsc::channel(4);

    let controls = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(Interaction::new(INVOKER, Control::Kill)).await.unwrap();
    });

    let started = std::time::Instant::now();
    let report = run_shell(
        &request,
        &local(Duration::from_secs(20)),
        &session(),
        recorder.clone(),
        rx,
    )
    .await
    .unwrap();
    controls.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(report.exit_code, -9);
    assert!(recorder.last().content.contains("[process exited with code -9]"));
}

#[tokio::test]
async fn test_idle_process_is_stopped() {
    let recorder = Arc::new(Recorder::default());
    let request = ShellRequest::new(INVOKER, "echo waiting; exec sleep 30");

    let result = run_shell(
        &request,
        &local(Duration::from_millis(300)),
        &session(),
        recorder.clone(),
        no_controls(),
    )
    .await;

    assert!(matches!(result, Err(ShellPagerError::IdleTimeout(_))));
    let last = recorder.last();
    assert!(last.content.contains("waiting"));
    assert!(last.content.contains("without output]"));
    assert_eq!(last.controls.enabled().count(), 0);
}

#[tokio::test]
async fn test_spawn_failure_renders_nothing() {
    let recorder = Arc::new(Recorder::default());
    let execution = ExecutionConfig {
        target: ExecutionTarget::new(["/no/such/shell", "-c"]).unwrap(),
        ..local(Duration::from_secs(5))
    };

    let result = run_shell(
        &ShellRequest::new(INVOKER, "true"),
        &execution,
        &session(),
        recorder.clone(),
        no_controls(),
    )
    .await;

    assert!(matches!(result, Err(ShellPagerError::Spawn(_))));
    assert_eq!(recorder.count(), 0);
}

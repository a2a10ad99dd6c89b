//! Display session: one command's pages, navigation and live updates.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::controls::{Control, ControlInputs, Controls};
use super::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use super::display::{DisplaySurface, RenderTarget, View};
use super::id::{ActorId, SessionId};
use super::navigation::Navigation;
use crate::error::ShellPagerError;
use crate::execution::{DrainTracker, Execution, ExecutionConfig, OutputItem};
use crate::output::{PageLayout, Paginator};
use crate::Result;

/// Shown until the first line of output arrives.
pub const PLACEHOLDER: &str = "executing...";

/// Private reply to someone pressing another user's controls.
pub const UNAUTHORIZED_NOTICE: &str = "You cannot control this pagination menu!";

/// Default inactivity before a session stops accepting input.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(180);

/// Settings for display sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Page size and decoration.
    pub layout: PageLayout,
    /// Minimum spacing of output-driven renders.
    pub debounce: Duration,
    /// Inactivity after which controls are disabled for good.
    pub session_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            layout: PageLayout::default(),
            debounce: DEFAULT_DEBOUNCE,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

/// A control press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    /// Who pressed it.
    pub actor: ActorId,
    /// What was pressed.
    pub control: Control,
}

impl Interaction {
    /// Create a new interaction.
    pub fn new(actor: ActorId, control: Control) -> Self {
        Self { actor, control }
    }
}

/// What handling an interaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// State changed (or was a no-op move) and the display was refreshed.
    Applied,
    /// The actor is not the invoker; nothing changed.
    Unauthorized,
    /// The session timed out; nothing changed.
    Ignored,
}

/// A command to run on behalf of an invoker.
#[derive(Debug, Clone)]
pub struct ShellRequest {
    /// User who issued the command and owns the controls.
    pub invoker: ActorId,
    /// Shell command line.
    pub command: String,
}

impl ShellRequest {
    /// Create a new request.
    pub fn new(invoker: ActorId, command: impl Into<String>) -> Self {
        Self {
            invoker,
            command: command.into(),
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Session identifier.
    pub session: SessionId,
    /// Exit code of the process.
    pub exit_code: i32,
    /// Pages produced.
    pub pages: usize,
}

/// Pages, navigation and display handle for one command.
///
/// All mutation happens on the task driving the session. Renders caused
/// by output are debounced; renders caused by interactions are immediate.
pub struct DisplaySession {
    id: SessionId,
    invoker: ActorId,
    paginator: Paginator,
    navigation: Navigation,
    target: RenderTarget,
    debouncer: Debouncer,
    drains: Option<DrainTracker>,
    terminal: bool,
    session_timeout: Duration,
    last_activity: Instant,
}

impl DisplaySession {
    /// Create a session for `invoker` rendering onto `surface`.
    pub fn new(invoker: ActorId, surface: Arc<dyn DisplaySurface>, config: &SessionConfig) -> Self {
        Self {
            id: SessionId::next(),
            invoker,
            paginator: Paginator::new(config.layout.clone()),
            navigation: Navigation::new(),
            target: RenderTarget::new(surface),
            debouncer: Debouncer::new(config.debounce),
            drains: None,
            terminal: false,
            session_timeout: config.session_timeout,
            last_activity: Instant::now(),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// User allowed to press controls.
    pub fn invoker(&self) -> ActorId {
        self.invoker
    }

    /// Accumulated pages.
    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Current navigation state.
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// Whether the session timed out.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Whether the display message is gone and renders are skipped.
    pub fn is_headless(&self) -> bool {
        self.target.is_gone()
    }

    /// When the session times out if nothing else happens.
    pub fn deadline(&self) -> Instant {
        self.last_activity + self.session_timeout
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Attach a running process so its controls can be enabled.
    pub fn bind(&mut self, drains: DrainTracker) {
        self.drains = Some(drains);
    }

    /// Detach the process; kill and terminate become disabled.
    pub fn unbind(&mut self) {
        self.drains = None;
    }

    /// Index of the page on display; 0 while there are none.
    pub fn display_index(&self) -> usize {
        self.navigation
            .display_index(self.paginator.page_count())
            .unwrap_or(0)
    }

    /// Button states for the current state.
    pub fn controls(&self) -> Controls {
        Controls::derive(ControlInputs {
            display_index: self.display_index(),
            last_index: self.paginator.last_index().unwrap_or(0),
            process_running: self.drains.as_ref().is_some_and(|d| !d.is_closed()),
            terminal: self.terminal,
        })
    }

    /// What a render would show right now.
    pub fn view(&self) -> View {
        let content = self
            .navigation
            .display_index(self.paginator.page_count())
            .and_then(|index| self.paginator.rendered_page(index))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        View {
            content,
            controls: self.controls(),
        }
    }

    /// Send the first render.
    pub async fn open(&mut self) -> Result<()> {
        self.target.render(&self.view()).await?;
        Ok(())
    }

    /// Append text and request a debounced render.
    pub fn push_fragment(&mut self, text: &str) {
        self.paginator.add_fragment(text);
        self.touch();
        self.request_render();
    }

    /// Append one line of process output.
    pub fn push_item(&mut self, item: &OutputItem) {
        self.push_fragment(&item.display_text());
    }

    fn request_render(&mut self) {
        if self.terminal || self.target.is_gone() {
            return;
        }
        let view = self.view();
        let target = self.target.clone();
        self.debouncer.schedule(async move {
            let _ = target.render(&view).await;
        });
    }

    /// Drop any pending render and show the current state now.
    ///
    /// Does nothing once the session has timed out; the frozen view stays.
    pub async fn settle(&mut self) {
        if self.terminal {
            return;
        }
        self.debouncer.cancel();
        if let Err(e) = self.target.render(&self.view()).await {
            debug!(session = %self.id, "settle render failed: {}", e);
        }
    }

    /// Apply a control press from `interaction.actor`.
    ///
    /// Presses from anyone but the invoker get a private notice and change
    /// nothing. Kill and terminate go to `execution` when one is running.
    pub async fn handle(
        &mut self,
        interaction: Interaction,
        execution: Option<&Execution>,
    ) -> InteractionOutcome {
        if interaction.actor != self.invoker {
            info!(session = %self.id, actor = %interaction.actor, "rejected control from non-invoker");
            self.target
                .notify(interaction.actor, UNAUTHORIZED_NOTICE)
                .await;
            return InteractionOutcome::Unauthorized;
        }
        if self.terminal {
            return InteractionOutcome::Ignored;
        }

        self.touch();
        let control = interaction.control;
        if control.is_process_control() {
            if let Some(execution) = execution {
                match control {
                    Control::Kill => execution.kill(),
                    _ => execution.terminate(),
                }
            }
        } else {
            self.navigation.apply(control, self.paginator.page_count());
        }
        debug!(session = %self.id, control = %interaction.control, page = self.display_index(), "control applied");

        self.settle().await;
        InteractionOutcome::Applied
    }

    /// Time the session out: disable every control and freeze the display.
    pub async fn expire(&mut self) {
        if self.terminal {
            return;
        }
        self.terminal = true;
        self.debouncer.cancel();
        info!(session = %self.id, "session timed out");
        if let Err(e) = self.target.render(&self.view()).await {
            debug!(session = %self.id, "final render failed: {}", e);
        }
    }
}

/// Start `request` and drive its session to completion.
///
/// Spawn failures are returned before anything is rendered.
pub async fn run_shell(
    request: &ShellRequest,
    execution: &ExecutionConfig,
    session: &SessionConfig,
    surface: Arc<dyn DisplaySurface>,
    interactions: mpsc::Receiver<Interaction>,
) -> Result<SessionReport> {
    run_shell_until(
        request,
        execution,
        session,
        surface,
        interactions,
        std::future::pending(),
    )
    .await
}

/// Like [`run_shell`], but stops the process and ends the session early
/// once `cancel` completes.
pub async fn run_shell_until<C>(
    request: &ShellRequest,
    execution: &ExecutionConfig,
    session: &SessionConfig,
    surface: Arc<dyn DisplaySurface>,
    interactions: mpsc::Receiver<Interaction>,
    cancel: C,
) -> Result<SessionReport>
where
    C: Future<Output = ()>,
{
    let execution = Execution::start(execution, &request.command)?;
    drive_until(request.invoker, execution, session, surface, interactions, cancel).await
}

/// Drive an already started execution through its display session.
///
/// Streams output into pages while answering interactions, always shuts
/// the process down, appends an exit line, then keeps serving navigation
/// until the session times out or `interactions` closes. Idle timeouts and
/// unresponsive processes end the session at once and are returned.
pub async fn drive(
    invoker: ActorId,
    execution: Execution,
    config: &SessionConfig,
    surface: Arc<dyn DisplaySurface>,
    interactions: mpsc::Receiver<Interaction>,
) -> Result<SessionReport> {
    drive_until(
        invoker,
        execution,
        config,
        surface,
        interactions,
        std::future::pending(),
    )
    .await
}

/// [`drive`] with a cancellation signal.
///
/// When `cancel` completes the process goes through the same shutdown as
/// when its output ends, and the session expires right after the exit
/// line instead of waiting for the inactivity timeout.
pub async fn drive_until<C>(
    invoker: ActorId,
    mut execution: Execution,
    config: &SessionConfig,
    surface: Arc<dyn DisplaySurface>,
    mut interactions: mpsc::Receiver<Interaction>,
    cancel: C,
) -> Result<SessionReport>
where
    C: Future<Output = ()>,
{
    let mut session = DisplaySession::new(invoker, surface, config);
    info!(session = %session.id(), command = execution.command(), "session started");

    session.bind(execution.drains());
    if let Err(e) = session.open().await {
        if let Err(teardown) = execution.shutdown().await {
            error!(session = %session.id(), "display failed ({}) and {}", e, teardown);
            return Err(teardown);
        }
        return Err(e);
    }
    session.push_fragment(&format!("$ {}\n", execution.command()));

    let mut output = execution.take_output()?;
    let mut interactions_open = true;
    let mut cancelled = false;
    tokio::pin!(cancel);

    let streamed: Result<()> = loop {
        tokio::select! {
            item = output.next() => match item {
                Some(Ok(item)) => session.push_item(&item),
                Some(Err(e)) => break Err(e),
                None => break Ok(()),
            },
            interaction = interactions.recv(), if interactions_open => match interaction {
                Some(interaction) => {
                    session.handle(interaction, Some(&execution)).await;
                }
                None => interactions_open = false,
            },
            _ = tokio::time::sleep_until(session.deadline()), if !session.is_terminal() => {
                session.expire().await;
            }
            _ = &mut cancel => {
                info!(session = %session.id(), "session cancelled, stopping process");
                cancelled = true;
                break Ok(());
            }
        }
    };
    drop(output);

    let teardown = execution.shutdown().await;
    session.unbind();

    let code = match (streamed, teardown) {
        (_, Err(e)) => {
            session.push_fragment("\n$ [process did not exit]");
            session.settle().await;
            session.expire().await;
            return Err(e);
        }
        (Err(e), Ok(_)) => {
            if let ShellPagerError::IdleTimeout(idle) = &e {
                session.push_fragment(&format!(
                    "\n$ [process timed out after {}s without output]",
                    idle.as_secs()
                ));
            }
            session.settle().await;
            session.expire().await;
            return Err(e);
        }
        (Ok(()), Ok(code)) => code,
    };

    session.push_fragment(&format!("\n$ [process exited with code {code}]"));
    session.settle().await;
    info!(session = %session.id(), code, pages = session.paginator().page_count(), "process finished");

    while !cancelled && !session.is_terminal() && interactions_open {
        tokio::select! {
            interaction = interactions.recv() => match interaction {
                Some(interaction) => {
                    session.handle(interaction, None).await;
                }
                None => interactions_open = false,
            },
            _ = tokio::time::sleep_until(session.deadline()) => session.expire().await,
        }
    }
    session.expire().await;

    if session.is_headless() {
        warn!(session = %session.id(), "display was lost before the session ended");
    }

    Ok(SessionReport {
        session: session.id(),
        exit_code: code,
        pages: session.paginator().page_count(),
    })
}

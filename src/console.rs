//! Terminal display surface and stdin controls.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::session::{
    ActorId, Control, Controls, DisplayError, DisplaySurface, Interaction, UnknownControl, View,
};

/// The only actor on a local terminal.
pub const LOCAL_ACTOR: ActorId = ActorId(0);

/// Renders every view as a block of text followed by a controls line.
///
/// Enabled controls are shown as `[label]`, disabled ones as `(label)`.
pub struct ConsoleSurface<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleSurface<std::io::Stdout> {
    /// Surface writing to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSurface<W> {
    /// Surface writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self, text: &str) -> Result<(), DisplayError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| DisplayError::Other("console lock poisoned".into()))?;
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::BrokenPipe => DisplayError::Gone,
                _ => DisplayError::Other(e.to_string()),
            })
    }
}

/// One line listing every control and whether it can be pressed.
pub fn controls_line(controls: &Controls) -> String {
    Control::ALL
        .iter()
        .map(|control| {
            if controls.is_enabled(*control) {
                format!("[{}]", control.label())
            } else {
                format!("({})", control.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl<W: Write + Send> DisplaySurface for ConsoleSurface<W> {
    async fn render(&self, view: &View) -> Result<(), DisplayError> {
        self.write(&format!(
            "{}\n{}\n",
            view.content,
            controls_line(&view.controls)
        ))
    }

    async fn notify(&self, actor: ActorId, message: &str) -> Result<(), DisplayError> {
        self.write(&format!("[to {}] {}\n", actor, message))
    }
}

/// Turn one stdin line into an interaction by `actor`.
///
/// Blank lines yield `None`.
pub fn parse_interaction(
    line: &str,
    actor: ActorId,
) -> Option<Result<Interaction, UnknownControl>> {
    if line.trim().is_empty() {
        return None;
    }
    Some(
        line.parse::<Control>()
            .map(|control| Interaction::new(actor, control)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ControlInputs;

    #[test]
    fn test_controls_line() {
        let controls = Controls::derive(ControlInputs {
            display_index: 0,
            last_index: 2,
            process_running: true,
            terminal: false,
        });
        assert_eq!(
            controls_line(&controls),
            "(≪) (Back) [Forward] [≫] [Kill] [Terminate]"
        );
    }

    #[tokio::test]
    async fn test_render_writes_content_and_controls() {
        let surface = ConsoleSurface::new(Vec::new());
        let view = View {
            content: "```ansi\nhello\n```".to_string(),
            controls: Controls::disabled(),
        };
        surface.render(&view).await.unwrap();

        let written = String::from_utf8(surface.into_inner()).unwrap();
        assert!(written.starts_with("```ansi\nhello\n```\n"));
        assert!(written.ends_with("(Kill) (Terminate)\n"));
    }

    #[tokio::test]
    async fn test_notify() {
        let surface = ConsoleSurface::new(Vec::new());
        surface.notify(ActorId(7), "nope").await.unwrap();
        assert_eq!(String::from_utf8(surface.into_inner()).unwrap(), "[to 7] nope\n");
    }

    #[test]
    fn test_parse_interaction() {
        let parsed = parse_interaction(" back \n", LOCAL_ACTOR).unwrap().unwrap();
        assert_eq!(parsed, Interaction::new(LOCAL_ACTOR, Control::Back));

        assert!(parse_interaction("   ", LOCAL_ACTOR).is_none());
        assert!(parse_interaction("jump", LOCAL_ACTOR).unwrap().is_err());
    }
}

//! The fixed set of controls shown under a page.

use std::fmt;
use std::str::FromStr;

/// A button on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Jump to the first page.
    Start,
    /// One page back.
    Back,
    /// One page forward.
    Forward,
    /// Follow the latest page.
    End,
    /// SIGKILL the process.
    Kill,
    /// SIGTERM the process.
    Terminate,
}

impl Control {
    /// Every control in display order.
    pub const ALL: [Control; 6] = [
        Control::Start,
        Control::Back,
        Control::Forward,
        Control::End,
        Control::Kill,
        Control::Terminate,
    ];

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Control::Start => "≪",
            Control::Back => "Back",
            Control::Forward => "Forward",
            Control::End => "≫",
            Control::Kill => "Kill",
            Control::Terminate => "Terminate",
        }
    }

    /// Whether this control signals the process rather than paging.
    pub fn is_process_control(&self) -> bool {
        matches!(self, Control::Kill | Control::Terminate)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error parsing a control name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownControl(pub String);

impl fmt::Display for UnknownControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown control: '{}'", self.0)
    }
}

impl std::error::Error for UnknownControl {}

impl FromStr for Control {
    type Err = UnknownControl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "first" | "<<" => Ok(Control::Start),
            "back" | "prev" | "<" => Ok(Control::Back),
            "forward" | "next" | ">" => Ok(Control::Forward),
            "end" | "last" | ">>" => Ok(Control::End),
            "kill" => Ok(Control::Kill),
            "terminate" | "term" => Ok(Control::Terminate),
            _ => Err(UnknownControl(s.trim().to_string())),
        }
    }
}

/// Position and process facts the enablement rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInputs {
    /// Page being displayed (0 when there are no pages).
    pub display_index: usize,
    /// Index of the latest page (0 when there are no pages).
    pub last_index: usize,
    /// A process is bound and its pipes are still open.
    pub process_running: bool,
    /// The session timed out.
    pub terminal: bool,
}

/// Enabled/disabled state of every control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    enabled: [bool; 6],
}

impl Controls {
    /// Derive enablement from session state.
    pub fn derive(inputs: ControlInputs) -> Self {
        let live = !inputs.terminal;
        let can_go_back = live && inputs.display_index != 0;
        let can_go_forward = live && inputs.display_index != inputs.last_index;
        let can_signal = live && inputs.process_running;

        let mut enabled = [false; 6];
        enabled[Control::Start.index()] = can_go_back;
        enabled[Control::Back.index()] = can_go_back;
        enabled[Control::Forward.index()] = can_go_forward;
        enabled[Control::End.index()] = can_go_forward;
        enabled[Control::Kill.index()] = can_signal;
        enabled[Control::Terminate.index()] = can_signal;
        Self { enabled }
    }

    /// Every control disabled.
    pub fn disabled() -> Self {
        Self {
            enabled: [false; 6],
        }
    }

    /// Whether `control` can be pressed.
    pub fn is_enabled(&self, control: Control) -> bool {
        self.enabled[control.index()]
    }

    /// Controls that can be pressed, in display order.
    pub fn enabled(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL.into_iter().filter(|c| self.is_enabled(*c))
    }
}

//! Which page a viewer is looking at.

use super::controls::Control;

/// Navigation state of one display session.
///
/// While `pinned`, the viewer follows the latest page as output arrives.
/// Any backwards move unpins; only [`Control::End`] pins again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pinned: bool,
    current: usize,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            pinned: true,
            current: 0,
        }
    }
}

impl Navigation {
    /// Start pinned to the latest page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the viewer follows the latest page.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Page to display given `page_count` pages, `None` if there are none.
    pub fn display_index(&self, page_count: usize) -> Option<usize> {
        let last = page_count.checked_sub(1)?;
        if self.pinned {
            Some(last)
        } else {
            Some(self.current.min(last))
        }
    }

    fn set_index(&mut self, index: usize) {
        self.current = index;
        self.pinned = false;
    }

    /// Apply a paging control. Process controls are ignored.
    ///
    /// With no pages every move leaves the viewer pinned at page 0.
    pub fn apply(&mut self, control: Control, page_count: usize) {
        let Some(display) = self.display_index(page_count) else {
            *self = Self::default();
            return;
        };
        let last = page_count - 1;

        match control {
            Control::Start => self.set_index(0),
            Control::Back => {
                if display != 0 {
                    self.set_index(display - 1);
                }
            }
            Control::Forward => {
                if display != last {
                    self.set_index(display + 1);
                }
            }
            Control::End => self.pinned = true,
            Control::Kill | Control::Terminate => {}
        }
    }
}

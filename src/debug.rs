//! Debug panel state.
//!
//! The panel holds no parameters; it only tracks its title, width and
//! visibility, which `h` toggles. Nothing is drawn for it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugPanel {
    pub title: String,
    pub width: u32,
    visible: bool,
}

impl DebugPanel {
    pub fn new(title: impl Into<String>, width: u32) -> Self {
        Self {
            title: title.into(),
            width,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flips visibility and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}

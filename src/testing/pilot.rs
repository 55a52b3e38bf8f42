//! Pilot: programmatic interaction with a headless GUI.
//!
//! The `Pilot` wraps a [`Gui`] over a [`HeadlessBackend`] and provides
//! methods to queue user input (key presses, clicks, wheel, resize), run
//! frames with a declaration body, and read the drawn screen back as text.

use crate::config::GuiConfig;
use crate::event::{InputEvent, Key, KeyEvent, Modifiers, MouseEvent, ScrollEvent};
use crate::gui::{FrameStats, Gui};
use crate::platform::HeadlessBackend;
use crate::tree::Dirty;

use super::snapshot::screen_to_string;

/// Frames [`Pilot::settle`] runs at most.
pub const SETTLE_LIMIT: usize = 16;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless GUI driver for testing.
///
/// Input is queued on the backend and dispatched at the end of the next
/// frame, exactly like terminal input. A declaration therefore sees the
/// effect of an event one frame after the frame that dispatched it;
/// [`settle`](Self::settle) runs frames until nothing is pending.
///
/// # Examples
///
/// ```
/// use arbor::testing::Pilot;
///
/// let mut pilot = Pilot::new(20, 3);
/// let mut clicked = false;
/// pilot.frame(|gui| clicked |= gui.button("ok"));
/// pilot.click(1, 0);
/// pilot.settle(|gui| clicked |= gui.button("ok"));
/// assert!(clicked);
/// ```
pub struct Pilot {
    gui: Gui<HeadlessBackend>,
}

impl Pilot {
    /// A headless GUI of the given size with the default configuration.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_config(width, height, GuiConfig::default())
    }

    pub fn with_config(width: u16, height: u16, config: GuiConfig) -> Self {
        Self {
            gui: Gui::headless(width, height, config),
        }
    }

    // ── Input simulation ─────────────────────────────────────────────

    fn push(&mut self, event: InputEvent) {
        self.gui.backend_mut().push(event);
    }

    /// Queue a key press with no modifiers.
    pub fn press_key(&mut self, key: Key) {
        self.press_key_with(key, Modifiers::NONE);
    }

    /// Queue a key press with the given modifiers.
    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) {
        self.push(InputEvent::Key(KeyEvent::new(key, modifiers)));
    }

    /// Queue each character of `text` as an individual key press.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press_key(Key::Char(ch));
        }
    }

    /// Queue a paste of `text`.
    pub fn paste(&mut self, text: &str) {
        self.push(InputEvent::Paste(text.to_owned()));
    }

    /// Queue a left-button press at (x, y).
    pub fn click(&mut self, x: i32, y: i32) {
        self.push(InputEvent::Mouse(MouseEvent::click(x, y)));
    }

    /// Queue a pointer move to (x, y).
    pub fn hover(&mut self, x: i32, y: i32) {
        self.push(InputEvent::Mouse(MouseEvent::moved(x, y)));
    }

    /// Queue a vertical wheel event of `lines` at (x, y).
    pub fn scroll(&mut self, x: i32, y: i32, lines: i32) {
        self.push(InputEvent::Scroll(ScrollEvent::vertical(x, y, lines)));
    }

    /// Resize the window. Takes effect when the next frame begins.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.gui.backend_mut().resize(width, height);
    }

    // ── Frames ───────────────────────────────────────────────────────

    /// Run one frame with `body` as the declaration.
    pub fn frame(&mut self, body: impl FnOnce(&mut Gui<HeadlessBackend>)) -> FrameStats {
        self.gui.frame(body);
        self.gui.stats()
    }

    /// Run frames until no input is queued and nothing is dirty, at most
    /// [`SETTLE_LIMIT`]. Returns the number of frames run.
    pub fn settle(&mut self, mut body: impl FnMut(&mut Gui<HeadlessBackend>)) -> usize {
        let mut frames = 0;
        while frames < SETTLE_LIMIT && self.gui.running() {
            self.gui.frame(&mut body);
            frames += 1;
            if self.is_idle() {
                break;
            }
        }
        frames
    }

    /// Whether the next frame would have nothing to do.
    pub fn is_idle(&self) -> bool {
        let root = self.gui.tree().root();
        self.gui.backend().pending() == 0
            && !self
                .gui
                .tree()
                .is_dirty(root, Dirty::SELF | Dirty::CHILD | Dirty::LAYOUT)
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn gui(&self) -> &Gui<HeadlessBackend> {
        &self.gui
    }

    pub fn gui_mut(&mut self) -> &mut Gui<HeadlessBackend> {
        &mut self.gui
    }

    /// Whether the GUI is still running (has not quit).
    pub fn is_running(&self) -> bool {
        self.gui.running()
    }

    /// The drawn screen as text, one line per row. Each row loses its
    /// trailing blanks; blank rows are kept.
    pub fn screen_text(&self) -> String {
        screen_to_string(self.gui.screen())
    }

    /// One drawn row, trailing blanks trimmed.
    pub fn row(&self, y: u16) -> String {
        self.gui.screen().row_text(y)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::text_input::TextInputConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_creates_headless_gui() {
        let pilot = Pilot::new(80, 24);
        assert!(pilot.is_running());
        assert_eq!(pilot.gui().screen().width(), 80);
        assert_eq!(pilot.gui().screen().height(), 24);
    }

    #[test]
    fn with_config_preserves_settings() {
        let pilot = Pilot::with_config(10, 2, GuiConfig::new().with_title("t").with_fps(30));
        assert_eq!(pilot.gui().config().title.as_deref(), Some("t"));
        assert_eq!(pilot.gui().config().fps, 30);
    }

    #[test]
    fn input_is_queued_until_the_next_frame() {
        let mut pilot = Pilot::new(10, 2);
        pilot.type_text("abc");
        pilot.click(0, 0);
        assert_eq!(pilot.gui().backend().pending(), 4);
        let stats = pilot.frame(|gui| gui.text("x"));
        assert_eq!(stats.events, 4);
        assert_eq!(pilot.gui().backend().pending(), 0);
    }

    #[test]
    fn settle_stops_when_idle() {
        let mut pilot = Pilot::new(10, 2);
        let frames = pilot.settle(|gui| gui.text("still"));
        assert_eq!(frames, 1);
        // The second row is blank.
        assert_eq!(pilot.screen_text(), "still\n");
    }

    #[test]
    fn settle_delivers_typed_text() {
        let mut pilot = Pilot::new(20, 2);
        let mut last = None;
        let config = TextInputConfig::new(10);
        let mut body = |gui: &mut Gui<HeadlessBackend>| {
            let name = gui.variable(String::new);
            if let Some(text) = gui.text_input(name, &config) {
                last = Some(text);
            }
        };
        pilot.frame(&mut body);
        pilot.click(0, 0);
        pilot.type_text("hey");
        pilot.settle(&mut body);
        drop(body);
        assert_eq!(last.as_deref(), Some("hey"));
        assert!(pilot.row(0).starts_with("hey"));
    }

    #[test]
    fn ctrl_c_stops_the_pilot() {
        let mut pilot = Pilot::new(10, 2);
        pilot.press_key_with(Key::Char('c'), Modifiers::CTRL);
        pilot.settle(|gui| gui.text("x"));
        assert!(!pilot.is_running());
    }
}

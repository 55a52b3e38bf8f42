//! Input event types wrapping crossterm for decoupling.
//!
//! Defines [`InputEvent`], [`KeyEvent`], [`MouseEvent`], [`ScrollEvent`] and
//! supporting types. Crossterm events are converted by [`from_crossterm`] so
//! element systems never depend on crossterm directly.

use bitflags::bitflags;

use crate::geometry::Offset;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, decoupled from crossterm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

bitflags! {
    /// Modifier key bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
    }
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers::empty();
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A keyboard event with key and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key event without modifiers.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// The character this event types into a text field, if any.
    ///
    /// Ctrl and Alt chords do not type.
    pub fn typed_char(&self) -> Option<char> {
        match self.code {
            Key::Char(c) if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => Some(c),
            _ => None,
        }
    }

    /// Whether the event activates a control (Enter or Space).
    pub fn is_activation(&self) -> bool {
        matches!(self.code, Key::Enter | Key::Char(' ')) && self.modifiers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MouseButton / MouseAction / MouseEvent / ScrollEvent
// ---------------------------------------------------------------------------

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Mouse action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
}

/// A mouse event in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub position: Offset,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// A left click at `(x, y)`.
    pub fn click(x: i32, y: i32) -> Self {
        Self {
            action: MouseAction::Down(MouseButton::Left),
            position: Offset::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Pointer movement to `(x, y)`.
    pub fn moved(x: i32, y: i32) -> Self {
        Self {
            action: MouseAction::Moved,
            position: Offset::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Whether this is a left button press.
    pub fn is_left_down(&self) -> bool {
        self.action == MouseAction::Down(MouseButton::Left)
    }
}

/// A wheel event. Positive `delta.y` scrolls content up (towards the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollEvent {
    pub position: Offset,
    pub delta: Offset,
    pub modifiers: Modifiers,
}

impl ScrollEvent {
    /// A vertical scroll of `lines` at `(x, y)`.
    pub fn vertical(x: i32, y: i32, lines: i32) -> Self {
        Self {
            position: Offset::new(x, y),
            delta: Offset::new(0, lines),
            modifiers: Modifiers::NONE,
        }
    }
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// Top-level input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Scroll(ScrollEvent),
    Resize { width: u16, height: u16 },
    Paste(String),
    FocusGained,
    FocusLost,
}

// ---------------------------------------------------------------------------
// crossterm conversions
// ---------------------------------------------------------------------------

/// Convert crossterm key modifiers to our `Modifiers`.
fn convert_modifiers(m: crossterm::event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(crossterm::event::KeyModifiers::SHIFT) {
        out |= Modifiers::SHIFT;
    }
    if m.contains(crossterm::event::KeyModifiers::CONTROL) {
        out |= Modifiers::CTRL;
    }
    if m.contains(crossterm::event::KeyModifiers::ALT) {
        out |= Modifiers::ALT;
    }
    out
}

/// Convert a crossterm key code. `None` for keys we do not handle.
fn convert_key(code: crossterm::event::KeyCode) -> Option<Key> {
    use crossterm::event::KeyCode;
    Some(match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    })
}

/// Convert a crossterm mouse button to our `MouseButton`.
fn convert_mouse_button(b: crossterm::event::MouseButton) -> MouseButton {
    match b {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

/// Convert a crossterm `Event` into our `InputEvent`.
///
/// Returns `None` for key releases and keys we don't handle.
pub fn from_crossterm(event: crossterm::event::Event) -> Option<InputEvent> {
    use crossterm::event::{Event, KeyEventKind, MouseEventKind};
    match event {
        Event::Key(ke) => {
            if ke.kind == KeyEventKind::Release {
                return None;
            }
            let code = convert_key(ke.code)?;
            Some(InputEvent::Key(KeyEvent::new(code, convert_modifiers(ke.modifiers))))
        }
        Event::Mouse(me) => {
            let modifiers = convert_modifiers(me.modifiers);
            let position = Offset::new(i32::from(me.column), i32::from(me.row));
            let scroll = |dx: i32, dy: i32| {
                Some(InputEvent::Scroll(ScrollEvent {
                    position,
                    delta: Offset::new(dx, dy),
                    modifiers,
                }))
            };
            let action = match me.kind {
                MouseEventKind::Down(b) => MouseAction::Down(convert_mouse_button(b)),
                MouseEventKind::Up(b) => MouseAction::Up(convert_mouse_button(b)),
                MouseEventKind::Drag(b) => MouseAction::Drag(convert_mouse_button(b)),
                MouseEventKind::Moved => MouseAction::Moved,
                MouseEventKind::ScrollUp => return scroll(0, -1),
                MouseEventKind::ScrollDown => return scroll(0, 1),
                MouseEventKind::ScrollLeft => return scroll(-1, 0),
                MouseEventKind::ScrollRight => return scroll(1, 0),
            };
            Some(InputEvent::Mouse(MouseEvent {
                action,
                position,
                modifiers,
            }))
        }
        Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        Event::FocusGained => Some(InputEvent::FocusGained),
        Event::FocusLost => Some(InputEvent::FocusLost),
        Event::Paste(s) => Some(InputEvent::Paste(s)),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

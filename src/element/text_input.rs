//! Text input: a focusable single-line edit field bound to a variable.
//!
//! The field keeps its own edit buffer. Every edit is committed through the
//! node's commit function, which parses the buffer and writes the bound
//! variable. A buffer that does not parse stays on screen, is drawn with the
//! `invalid` style, and leaves the variable at its last valid value.

use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

use crate::data::{DataGraph, VarId};
use crate::event::{Key, KeyEvent, MouseEvent};
use crate::geometry::{Offset, Size};
use crate::storage::SlotStorage;
use crate::text::{clip_to_width, display_width, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::DynamicWeight;
use super::system::{ElementSystem, EventOutcome, RenderContext};

/// Parses an edit buffer into the bound variable. Returns the readers to
/// re-evaluate, or `None` when the text is not a valid value.
pub type Commit = Box<dyn Fn(&mut DataGraph, &str) -> Option<Vec<NodeId>>>;

// ---------------------------------------------------------------------------
// TextInputConfig
// ---------------------------------------------------------------------------

/// Declaration of a text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputConfig {
    /// Visible width in cells.
    pub width: i32,
    /// Shown dimmed while the buffer is empty.
    pub placeholder: String,
}

impl Default for TextInputConfig {
    fn default() -> Self {
        Self {
            width: 20,
            placeholder: String::new(),
        }
    }
}

impl TextInputConfig {
    pub fn new(width: i32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Set the placeholder (builder).
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

// ---------------------------------------------------------------------------
// EditBuffer
// ---------------------------------------------------------------------------

/// A string with a cursor kept on a grapheme boundary (byte offset).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditBuffer {
    value: String,
    cursor: usize,
}

impl EditBuffer {
    /// A buffer holding `value` with the cursor at the end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in display cells.
    pub fn cursor_column(&self) -> usize {
        display_width(&self.value[..self.cursor])
    }

    /// The grapheme after the cursor, empty at the end.
    pub fn under_cursor(&self) -> &str {
        &self.value[self.cursor..self.next_boundary()]
    }

    /// Replace the whole value, moving the cursor to the end.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn insert(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Delete the grapheme before the cursor. Returns whether anything went.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = self.prev_boundary();
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
        true
    }

    /// Delete the grapheme after the cursor. Returns whether anything went.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.value.len() {
            return false;
        }
        let next = self.next_boundary();
        self.value.drain(self.cursor..next);
        true
    }

    pub fn left(&mut self) -> bool {
        let before = self.cursor;
        self.cursor = self.prev_boundary();
        self.cursor != before
    }

    pub fn right(&mut self) -> bool {
        let before = self.cursor;
        self.cursor = self.next_boundary();
        self.cursor != before
    }

    pub fn home(&mut self) -> bool {
        std::mem::replace(&mut self.cursor, 0) != 0
    }

    pub fn end(&mut self) -> bool {
        let end = self.value.len();
        std::mem::replace(&mut self.cursor, end) != end
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(self.cursor, |g| self.cursor + g.len())
    }
}

// ---------------------------------------------------------------------------
// TextInputSystem
// ---------------------------------------------------------------------------

pub struct TextInputState {
    pub config: TextInputConfig,
    pub buffer: EditBuffer,
    /// The buffer did not parse at the last commit.
    pub invalid: bool,
    pub focused: bool,
    /// The variable the commit function writes.
    pub bound: Option<VarId>,
    /// The value text last shown through [`TextInputSystem::sync`].
    synced: String,
    /// The bound value was last written by this input.
    wrote: bool,
    /// A committed edit not yet reported to the caller.
    edited: bool,
    commit: Option<Commit>,
}

impl fmt::Debug for TextInputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInputState")
            .field("config", &self.config)
            .field("buffer", &self.buffer)
            .field("invalid", &self.invalid)
            .field("focused", &self.focused)
            .field("bound", &self.bound)
            .field("synced", &self.synced)
            .field("wrote", &self.wrote)
            .field("edited", &self.edited)
            .finish_non_exhaustive()
    }
}

/// System for [`ElementKind::TextInput`](crate::tree::ElementKind::TextInput) nodes.
#[derive(Debug, Default)]
pub struct TextInputSystem {
    states: SlotStorage<TextInputState>,
}

impl TextInputSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, config: &TextInputConfig, text: &str) -> usize {
        self.states.emplace(TextInputState {
            config: config.clone(),
            buffer: EditBuffer::new(text),
            invalid: false,
            focused: false,
            bound: None,
            synced: text.to_owned(),
            wrote: false,
            edited: false,
            commit: None,
        })
    }

    /// Apply this frame's declaration. Returns whether the config differs.
    pub fn update(
        &mut self,
        state: usize,
        config: &TextInputConfig,
        bound: VarId,
        commit: Commit,
    ) -> bool {
        let current = &mut self.states[state];
        current.bound = Some(bound);
        current.commit = Some(commit);
        if current.config == *config {
            return false;
        }
        current.config = config.clone();
        true
    }

    /// Show `text` unless the buffer already stands for the same value.
    ///
    /// A value that has not changed since the last sync, or that this input
    /// wrote itself, leaves the buffer alone so text that failed to parse
    /// stays visible.
    pub fn sync(&mut self, state: usize, text: &str, same_value: impl FnOnce(&str) -> bool) {
        let current = &mut self.states[state];
        let wrote = std::mem::take(&mut current.wrote);
        if current.synced == text {
            return;
        }
        current.synced.clear();
        current.synced.push_str(text);
        if wrote {
            return;
        }
        if current.buffer.value() != text && !same_value(current.buffer.value()) {
            current.buffer.set(text);
            current.invalid = false;
        }
    }

    pub fn state(&self, state: usize) -> &TextInputState {
        &self.states[state]
    }

    /// Run the commit function over the current buffer.
    ///
    /// Returns the readers of the written variable; nothing is written when
    /// the buffer does not parse.
    pub fn commit(&mut self, state: usize, data: &mut DataGraph) -> Vec<NodeId> {
        let current = &mut self.states[state];
        let Some(commit) = current.commit.as_ref() else {
            return Vec::new();
        };
        match commit(data, current.buffer.value()) {
            Some(readers) => {
                current.invalid = false;
                current.edited = true;
                current.wrote = true;
                readers
            }
            None => {
                current.invalid = true;
                Vec::new()
            }
        }
    }

    /// Report and clear a pending committed edit.
    pub fn take_edited(&mut self, state: usize) -> bool {
        std::mem::take(&mut self.states[state].edited)
    }
}

impl ElementSystem for TextInputSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, _metrics: &dyn TextMeasure) {
        let width = self.states[tree[node].state].config.width.max(1);
        let layout = &mut tree[node].layout;
        layout.fixed_size = Size::new(width, 1);
        layout.dynamic = DynamicWeight::NONE;
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        let origin = tree[node].layout.region.origin();
        let width = state.config.width.max(1) as usize;

        let mut style = ctx.theme.input.clone();
        if state.invalid {
            style = style.patch(&ctx.theme.invalid);
        }
        ctx.text(origin, &" ".repeat(width), &style);

        let value = state.buffer.value();
        if value.is_empty() && !state.focused {
            let muted = style.patch(&ctx.theme.muted);
            ctx.text(origin, clip_to_width(&state.config.placeholder, width), &muted);
            return;
        }

        // Scroll horizontally so the cursor stays visible.
        let column = state.buffer.cursor_column();
        let under = state.buffer.under_cursor();
        let wanted = (column + display_width(under).max(1)).saturating_sub(width);
        // The window starts on a glyph boundary at or after `wanted`.
        let (mut start, mut from) = (0, value.len());
        for (i, glyph) in value.grapheme_indices(true) {
            if start >= wanted {
                from = i;
                break;
            }
            start += display_width(glyph);
        }
        ctx.text(origin, clip_to_width(&value[from..], width), &style);

        if state.focused {
            let at = origin + Offset::new(column.saturating_sub(start) as i32, 0);
            let caret = style.patch(&ctx.theme.focused);
            ctx.text(at, if under.is_empty() { " " } else { under }, &caret);
        }
    }

    fn mouse_event(
        &mut self,
        _tree: &Tree,
        _node: NodeId,
        event: &MouseEvent,
        _local: Offset,
    ) -> EventOutcome {
        // Clicking only focuses the field, which the dispatcher does.
        if event.is_left_down() {
            EventOutcome::Handled
        } else {
            EventOutcome::Ignored
        }
    }

    fn key_event(&mut self, tree: &Tree, node: NodeId, event: &KeyEvent) -> EventOutcome {
        let buffer = &mut self.states[tree[node].state].buffer;
        if let Some(ch) = event.typed_char() {
            buffer.insert(ch);
            return EventOutcome::Changed;
        }
        let (edited, moved) = match event.code {
            Key::Backspace => (buffer.backspace(), false),
            Key::Delete => (buffer.delete(), false),
            Key::Left => (false, buffer.left()),
            Key::Right => (false, buffer.right()),
            Key::Home => (false, buffer.home()),
            Key::End => (false, buffer.end()),
            _ => return EventOutcome::Ignored,
        };
        if edited {
            EventOutcome::Changed
        } else if moved {
            EventOutcome::Redraw
        } else {
            EventOutcome::Handled
        }
    }

    fn focusable(&self, _state: usize) -> bool {
        true
    }

    fn focus_enter(&mut self, state: usize) {
        self.states[state].focused = true;
    }

    fn focus_leave(&mut self, state: usize) {
        self.states[state].focused = false;
    }
}

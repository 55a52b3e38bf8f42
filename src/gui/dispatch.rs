//! Input routing.
//!
//! Input collected by `begin_frame` is dispatched at the end of the frame,
//! after layout, so hit-testing sees the boxes the user is looking at.
//! Pointer events go to the topmost node under the pointer, keys to the
//! focused node, and both bubble to ancestors until a system handles them.
//! Value changes are written to the bound variables right away; the
//! declaring code sees them on the next frame.

use tracing::{info, trace};

use crate::element::paint::{hit_test, paint_order, Hit, PaintStep};
use crate::element::EventOutcome;
use crate::event::{
    BindingAction, InputEvent, Key, KeyEvent, MouseAction, MouseEvent, ScrollEvent,
};
use crate::platform::Backend;
use crate::tree::{ElementKind, NodeId};

use super::Gui;

impl<B: Backend> Gui<B> {
    pub(super) fn dispatch_events(&mut self) {
        self.triggered.clear();
        if self.events.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.events);
        self.stats.events = events.len();
        let mut steps = paint_order(&self.tree, &self.systems, self.window);
        for event in events {
            trace!(?event, "dispatch");
            let moved = match event {
                InputEvent::Key(key) => {
                    self.dispatch_key(&key);
                    true
                }
                InputEvent::Mouse(mouse) => self.dispatch_mouse(&steps, &mouse),
                InputEvent::Scroll(scroll) => self.dispatch_scroll(&steps, &scroll),
                InputEvent::Paste(text) => {
                    self.dispatch_paste(&text);
                    false
                }
                InputEvent::Resize { .. } | InputEvent::FocusGained | InputEvent::FocusLost => {
                    self.needs_render = true;
                    false
                }
            };
            if !self.running {
                break;
            }
            // Scrolling and opening lists change what lies under the pointer.
            if moved {
                steps = paint_order(&self.tree, &self.systems, self.window);
            }
        }
    }

    // -- keys --------------------------------------------------------------

    fn dispatch_key(&mut self, key: &KeyEvent) {
        let Some(action) = self.config.bindings.resolve(key).cloned() else {
            if let Some(focused) = self.focus.focused() {
                self.bubble_key(focused, key);
            }
            return;
        };
        trace!(?action, "binding");
        match action {
            BindingAction::Quit => {
                info!("quit requested");
                self.running = false;
            }
            BindingAction::FocusNext => {
                let next = self.focus.next();
                self.set_focus(next);
            }
            BindingAction::FocusPrevious => {
                let previous = self.focus.previous();
                self.set_focus(previous);
            }
            BindingAction::CloseOverlay => {
                let target = self.focus.focused().or_else(|| self.topmost_floating());
                if let Some(target) = target {
                    self.bubble_key(target, key);
                }
            }
            BindingAction::Custom(name) => {
                self.triggered.push(name);
                self.tree.mark_dirty(self.tree.root());
            }
        }
    }

    /// Offer `key` to `start` and then its ancestors.
    fn bubble_key(&mut self, start: NodeId, key: &KeyEvent) -> bool {
        let mut current = Some(start);
        while let Some(node) = current {
            let outcome = self.systems.key_event(&self.tree, node, key);
            if outcome.is_handled() {
                self.apply(node, outcome);
                return true;
            }
            current = self.tree.parent(node);
        }
        false
    }

    /// The open floating window declared last.
    fn topmost_floating(&self) -> Option<NodeId> {
        self.tree
            .walk_depth_first(self.tree.root())
            .into_iter()
            .rev()
            .find(|&id| {
                let node = &self.tree[id];
                node.kind == ElementKind::Floating && self.systems.floating.state(node.state).open
            })
    }

    fn dispatch_paste(&mut self, text: &str) {
        let Some(focused) = self.focus.focused() else {
            return;
        };
        for ch in text.chars().filter(|c| !c.is_control()) {
            self.bubble_key(focused, &KeyEvent::plain(Key::Char(ch)));
        }
    }

    // -- pointer -----------------------------------------------------------

    fn dispatch_mouse(&mut self, steps: &[PaintStep], mouse: &MouseEvent) -> bool {
        let hit = hit_test(steps, &self.tree, &self.systems, mouse.position);
        if mouse.action == MouseAction::Moved {
            let node = hit.map(|h| h.node);
            if node != self.hovered {
                self.hovered = node;
                self.needs_render = true;
            }
            return false;
        }
        if mouse.is_left_down() {
            let target = hit.and_then(|h| self.focusable_at(h.node));
            self.set_focus(target);
        }
        match hit {
            Some(hit) => self.bubble_mouse(hit, mouse),
            None => false,
        }
    }

    /// `node` or its nearest focusable ancestor.
    fn focusable_at(&self, node: NodeId) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .find(|&id| self.systems.focusable(&self.tree, id))
    }

    fn bubble_mouse(&mut self, hit: Hit, mouse: &MouseEvent) -> bool {
        let Hit { mut node, mut local } = hit;
        loop {
            let outcome = self.systems.mouse_event(&self.tree, node, mouse, local);
            if outcome.is_handled() {
                self.apply(node, outcome);
                return true;
            }
            let Some(parent) = self.tree.parent(node) else {
                return false;
            };
            local = local + (self.tree[node].layout.region.origin()
                - self.tree[parent].layout.region.origin())
                + self.systems.child_offset(&self.tree, parent);
            node = parent;
        }
    }

    fn dispatch_scroll(&mut self, steps: &[PaintStep], scroll: &ScrollEvent) -> bool {
        let Some(hit) = hit_test(steps, &self.tree, &self.systems, scroll.position) else {
            return false;
        };
        let mut current = Some(hit.node);
        while let Some(node) = current {
            let outcome = self.systems.scroll_event(&self.tree, node, scroll);
            if outcome.is_handled() {
                self.apply(node, outcome);
                return true;
            }
            current = self.tree.parent(node);
        }
        false
    }

    // -- effects -----------------------------------------------------------

    pub(super) fn set_focus(&mut self, target: Option<NodeId>) {
        if self.focus.focused() == target {
            return;
        }
        if let Some(old) = self.focus.clear() {
            if self.tree.contains(old) {
                self.systems.focus_leave(&self.tree, old);
            }
        }
        if let Some(new) = target {
            if self.focus.focus(new) {
                self.systems.focus_enter(&self.tree, new);
            }
        }
        trace!(focused = ?self.focus.focused(), "focus moved");
        self.needs_render = true;
    }

    fn apply(&mut self, node: NodeId, outcome: EventOutcome) {
        self.needs_render |= outcome.needs_redraw();
        match outcome {
            EventOutcome::Changed => {
                let readers = self.commit(node);
                self.invalidate(readers);
                self.tree.mark_dirty(node);
            }
            EventOutcome::Dismiss => self.dismiss(node),
            EventOutcome::Ignored | EventOutcome::Handled | EventOutcome::Redraw => {}
        }
    }

    /// Write a changed element's value to its bound variable.
    fn commit(&mut self, node: NodeId) -> Vec<NodeId> {
        let (kind, state) = (self.tree[node].kind, self.tree[node].state);
        match kind {
            ElementKind::Checkbox => {
                let current = self.systems.checkbox.state(state);
                match current.bound {
                    Some(var) => {
                        let checked = current.checked;
                        self.data.write(var, checked)
                    }
                    None => Vec::new(),
                }
            }
            ElementKind::Dropdown => {
                let current = self.systems.dropdown.state(state);
                match current.bound {
                    Some(var) => {
                        let selected = current.selected;
                        self.data.write(var, selected)
                    }
                    None => Vec::new(),
                }
            }
            ElementKind::TextInput => self.systems.text_input.commit(state, &mut self.data),
            _ => Vec::new(),
        }
    }

    fn dismiss(&mut self, node: NodeId) {
        if self.tree[node].kind != ElementKind::Floating {
            return;
        }
        let state = self.tree[node].state;
        if let Some(open) = self.systems.floating.state(state).bound {
            let readers = self.data.write(open, false);
            self.invalidate(readers);
        }
    }
}

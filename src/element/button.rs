//! Button: a focusable label that reports clicks.

use crate::event::{KeyEvent, MouseEvent};
use crate::geometry::{Offset, Size};
use crate::storage::SlotStorage;
use crate::text::{measure_or_zero, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::DynamicWeight;
use super::system::{ElementSystem, EventOutcome, RenderContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: String,
    /// A click not yet reported to the caller.
    clicked: bool,
}

/// System for [`ElementKind::Button`](crate::tree::ElementKind::Button) nodes.
#[derive(Debug, Default)]
pub struct ButtonSystem {
    states: SlotStorage<ButtonState>,
}

impl ButtonSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, label: &str) -> usize {
        self.states.emplace(ButtonState {
            label: label.to_owned(),
            clicked: false,
        })
    }

    /// Apply this frame's declaration. Returns whether it differs.
    pub fn update(&mut self, state: usize, label: &str) -> bool {
        let current = &mut self.states[state];
        if current.label == label {
            return false;
        }
        current.label = label.to_owned();
        true
    }

    /// Report and clear a pending click.
    pub fn take_clicked(&mut self, state: usize) -> bool {
        std::mem::take(&mut self.states[state].clicked)
    }

    fn press(&mut self, state: usize) -> EventOutcome {
        self.states[state].clicked = true;
        EventOutcome::Changed
    }
}

impl ElementSystem for ButtonSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, metrics: &dyn TextMeasure) {
        let label = measure_or_zero(metrics, &self.states[tree[node].state].label, None);
        let layout = &mut tree[node].layout;
        // "[ label ]"
        layout.fixed_size = Size::new(label.width + 4, label.height.max(1));
        layout.dynamic = DynamicWeight::NONE;
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        let style = ctx.control_style(node);
        let text = format!("[ {} ]", state.label);
        ctx.text(tree[node].layout.region.origin(), &text, &style);
    }

    fn mouse_event(
        &mut self,
        tree: &Tree,
        node: NodeId,
        event: &MouseEvent,
        _local: Offset,
    ) -> EventOutcome {
        if event.is_left_down() {
            self.press(tree[node].state)
        } else {
            EventOutcome::Ignored
        }
    }

    fn key_event(&mut self, tree: &Tree, node: NodeId, event: &KeyEvent) -> EventOutcome {
        if event.is_activation() {
            self.press(tree[node].state)
        } else {
            EventOutcome::Ignored
        }
    }

    fn focusable(&self, _state: usize) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;
    use crate::text::CellMetrics;
    use crate::tree::ElementKind;

    fn setup() -> (Tree, ButtonSystem, NodeId) {
        let mut system = ButtonSystem::new();
        let mut tree = Tree::new(ElementKind::Series, 0);
        tree.begin();
        let id = tree.advance(ElementKind::Button, || system.create("OK")).id;
        tree.finish();
        (tree, system, id)
    }

    #[test]
    fn click_is_reported_once() {
        let (tree, mut system, id) = setup();
        let outcome = system.mouse_event(&tree, id, &MouseEvent::click(0, 0), Offset::ZERO);
        assert_eq!(outcome, EventOutcome::Changed);
        let state = tree[id].state;
        assert!(system.take_clicked(state));
        assert!(!system.take_clicked(state));
    }

    #[test]
    fn enter_and_space_press() {
        let (tree, mut system, id) = setup();
        let state = tree[id].state;
        system.key_event(&tree, id, &KeyEvent::plain(Key::Enter));
        assert!(system.take_clicked(state));
        system.key_event(&tree, id, &KeyEvent::plain(Key::Char(' ')));
        assert!(system.take_clicked(state));
        let outcome = system.key_event(&tree, id, &KeyEvent::plain(Key::Char('x')));
        assert_eq!(outcome, EventOutcome::Ignored);
    }

    #[test]
    fn size_includes_brackets() {
        let (mut tree, mut system, id) = setup();
        system.set_layout_input(&mut tree, id, &CellMetrics);
        assert_eq!(tree[id].layout.fixed_size, Size::new(6, 1));
    }
}

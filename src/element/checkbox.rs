//! Checkbox: a focusable toggle bound to a `Variable<bool>`.

use crate::data::Variable;
use crate::event::{KeyEvent, MouseEvent};
use crate::geometry::{Offset, Size};
use crate::storage::SlotStorage;
use crate::text::{measure_or_zero, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::DynamicWeight;
use super::system::{ElementSystem, EventOutcome, RenderContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxState {
    pub label: String,
    pub checked: bool,
    /// The variable user toggles are written to.
    pub bound: Option<Variable<bool>>,
    /// A toggle not yet reported to the caller.
    toggled: bool,
}

/// System for [`ElementKind::Checkbox`](crate::tree::ElementKind::Checkbox) nodes.
#[derive(Debug, Default)]
pub struct CheckboxSystem {
    states: SlotStorage<CheckboxState>,
}

impl CheckboxSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, label: &str, checked: bool) -> usize {
        self.states.emplace(CheckboxState {
            label: label.to_owned(),
            checked,
            bound: None,
            toggled: false,
        })
    }

    /// Apply this frame's declaration. Returns whether the label differs.
    pub fn update(&mut self, state: usize, label: &str, bound: Variable<bool>) -> bool {
        let current = &mut self.states[state];
        current.bound = Some(bound);
        if current.label == label {
            return false;
        }
        current.label = label.to_owned();
        true
    }

    /// Take the checked state from the bound variable.
    pub fn sync(&mut self, state: usize, checked: bool) {
        self.states[state].checked = checked;
    }

    pub fn state(&self, state: usize) -> &CheckboxState {
        &self.states[state]
    }

    /// Report and clear a pending toggle.
    pub fn take_toggled(&mut self, state: usize) -> bool {
        std::mem::take(&mut self.states[state].toggled)
    }

    fn toggle(&mut self, state: usize) -> EventOutcome {
        let s = &mut self.states[state];
        s.checked = !s.checked;
        s.toggled = true;
        EventOutcome::Changed
    }
}

impl ElementSystem for CheckboxSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, metrics: &dyn TextMeasure) {
        let label = measure_or_zero(metrics, &self.states[tree[node].state].label, None);
        let layout = &mut tree[node].layout;
        // "[x] label"
        layout.fixed_size = Size::new(label.width + 4, label.height.max(1));
        layout.dynamic = DynamicWeight::NONE;
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        let origin = tree[node].layout.region.origin();
        let mark = if state.checked { "[x]" } else { "[ ]" };
        let style = ctx.control_style(node);
        ctx.text(origin, mark, &style);
        let label_style = ctx.theme.text.clone();
        ctx.text(origin + Offset::new(4, 0), &state.label, &label_style);
    }

    fn mouse_event(
        &mut self,
        tree: &Tree,
        node: NodeId,
        event: &MouseEvent,
        _local: Offset,
    ) -> EventOutcome {
        if event.is_left_down() {
            self.toggle(tree[node].state)
        } else {
            EventOutcome::Ignored
        }
    }

    fn key_event(&mut self, tree: &Tree, node: NodeId, event: &KeyEvent) -> EventOutcome {
        if event.is_activation() {
            self.toggle(tree[node].state)
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
    use crate::tree::ElementKind;

    #[test]
    fn toggles_and_reports_once() {
        let mut system = CheckboxSystem::new();
        let mut tree = Tree::new(ElementKind::Series, 0);
        tree.begin();
        let id = tree
            .advance(ElementKind::Checkbox, || system.create("done", false))
            .id;
        tree.finish();
        let state = tree[id].state;

        system.key_event(&tree, id, &KeyEvent::plain(Key::Char(' ')));
        assert!(system.state(state).checked);
        assert!(system.take_toggled(state));
        assert!(!system.take_toggled(state));

        system.mouse_event(&tree, id, &MouseEvent::click(0, 0), Offset::ZERO);
        assert!(!system.state(state).checked);
    }

    #[test]
    fn sync_overrides_checked() {
        let mut system = CheckboxSystem::new();
        let s = system.create("x", false);
        system.sync(s, true);
        assert!(system.state(s).checked);
    }
}

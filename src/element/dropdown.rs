//! Dropdown: a header showing the selected choice and an overlay list.

use crate::data::Variable;
use crate::event::{Key, KeyEvent, MouseEvent};
use crate::geometry::{Offset, Region, Size};
use crate::render::BoxPrimitive;
use crate::storage::SlotStorage;
use crate::text::{display_width, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::DynamicWeight;
use super::system::{ElementSystem, EventOutcome, RenderContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownState {
    pub choices: Vec<String>,
    /// Always a valid index unless `choices` is empty.
    pub selected: usize,
    pub open: bool,
    /// Row under the keyboard cursor while open.
    pub highlighted: usize,
    pub bound: Option<Variable<usize>>,
    /// A pick not yet reported to the caller.
    picked: bool,
}

impl DropdownState {
    fn width(&self) -> i32 {
        let widest = self.choices.iter().map(|c| display_width(c)).max().unwrap_or(0);
        // "choice ▾"
        widest as i32 + 2
    }

    fn close(&mut self) -> EventOutcome {
        self.open = false;
        EventOutcome::Redraw
    }

    fn open(&mut self) -> EventOutcome {
        if self.choices.is_empty() {
            return EventOutcome::Handled;
        }
        self.open = true;
        self.highlighted = self.selected;
        EventOutcome::Redraw
    }

    fn pick(&mut self, index: usize) -> EventOutcome {
        self.open = false;
        if index == self.selected {
            return EventOutcome::Redraw;
        }
        self.selected = index;
        self.picked = true;
        EventOutcome::Changed
    }
}

/// System for [`ElementKind::Dropdown`](crate::tree::ElementKind::Dropdown) nodes.
#[derive(Debug, Default)]
pub struct DropdownSystem {
    states: SlotStorage<DropdownState>,
}

impl DropdownSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, choices: &[&str], selected: usize) -> usize {
        let selected = selected.min(choices.len().saturating_sub(1));
        self.states.emplace(DropdownState {
            choices: choices.iter().map(|&c| c.to_owned()).collect(),
            selected,
            open: false,
            highlighted: selected,
            bound: None,
            picked: false,
        })
    }

    /// Apply this frame's declaration. Returns whether the choices differ.
    pub fn update(&mut self, state: usize, choices: &[&str], bound: Variable<usize>) -> bool {
        let current = &mut self.states[state];
        current.bound = Some(bound);
        if current.choices.iter().map(String::as_str).eq(choices.iter().copied()) {
            return false;
        }
        current.choices = choices.iter().map(|&c| c.to_owned()).collect();
        let last = current.choices.len().saturating_sub(1);
        current.selected = current.selected.min(last);
        current.highlighted = current.highlighted.min(last);
        true
    }

    /// Take the selection from the bound variable.
    pub fn sync(&mut self, state: usize, selected: usize) {
        let current = &mut self.states[state];
        current.selected = selected.min(current.choices.len().saturating_sub(1));
    }

    pub fn state(&self, state: usize) -> &DropdownState {
        &self.states[state]
    }

    /// Report and clear a pending pick.
    pub fn take_picked(&mut self, state: usize) -> bool {
        std::mem::take(&mut self.states[state].picked)
    }
}

impl ElementSystem for DropdownSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, _metrics: &dyn TextMeasure) {
        let width = self.states[tree[node].state].width();
        let layout = &mut tree[node].layout;
        layout.fixed_size = Size::new(width, 1);
        layout.dynamic = DynamicWeight::NONE;
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        let width = state.width() as usize - 2;
        let current = state.choices.get(state.selected).map_or("", String::as_str);
        let arrow = if state.open { '▴' } else { '▾' };
        let header = format!("{current:<width$} {arrow}");
        let style = ctx.control_style(node);
        ctx.text(tree[node].layout.region.origin(), &header, &style);
    }

    fn overlay_region(&self, tree: &Tree, node: NodeId) -> Option<Region> {
        let state = &self.states[tree[node].state];
        if !state.open {
            return None;
        }
        let header = tree[node].layout.region;
        Some(Region::new(
            header.x,
            header.y + 1,
            state.width(),
            state.choices.len() as i32,
        ))
    }

    fn render_overlay(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let Some(list) = self.overlay_region(tree, node) else {
            return;
        };
        let state = &self.states[tree[node].state];
        let fill = BoxPrimitive {
            fill: Some(ctx.theme.overlay.clone()),
            border: None,
        };
        let region = ctx.visible(list);
        ctx.renderer.queue_box(region, &fill, ctx.clip);
        let width = list.width as usize;
        for (row, choice) in state.choices.iter().enumerate() {
            let style = if row == state.highlighted {
                ctx.theme.overlay.patch(&ctx.theme.selection)
            } else {
                ctx.theme.overlay.clone()
            };
            let line = format!("{choice:<width$}");
            ctx.text(list.origin() + Offset::new(0, row as i32), &line, &style);
        }
    }

    fn mouse_event(
        &mut self,
        tree: &Tree,
        node: NodeId,
        event: &MouseEvent,
        local: Offset,
    ) -> EventOutcome {
        if !event.is_left_down() {
            return EventOutcome::Ignored;
        }
        let state = &mut self.states[tree[node].state];
        if !state.open {
            return state.open();
        }
        // Row 0 is the header; the list starts right below it.
        let row = local.y - 1;
        if row >= 0 && (row as usize) < state.choices.len() {
            state.pick(row as usize)
        } else {
            state.close()
        }
    }

    fn key_event(&mut self, tree: &Tree, node: NodeId, event: &KeyEvent) -> EventOutcome {
        let state = &mut self.states[tree[node].state];
        if !state.open {
            return match event.code {
                Key::Down => state.open(),
                _ if event.is_activation() => state.open(),
                _ => EventOutcome::Ignored,
            };
        }
        let last = state.choices.len().saturating_sub(1);
        match event.code {
            Key::Up => {
                state.highlighted = state.highlighted.saturating_sub(1);
                EventOutcome::Redraw
            }
            Key::Down => {
                state.highlighted = (state.highlighted + 1).min(last);
                EventOutcome::Redraw
            }
            Key::Escape => state.close(),
            _ if event.is_activation() => state.pick(state.highlighted),
            _ => EventOutcome::Handled,
        }
    }

    fn focusable(&self, _state: usize) -> bool {
        true
    }

    fn focus_leave(&mut self, state: usize) {
        self.states[state].open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ElementKind;
    use pretty_assertions::assert_eq;

    const CHOICES: [&str; 3] = ["red", "green", "blue"];

    fn setup() -> (Tree, DropdownSystem, NodeId) {
        let mut system = DropdownSystem::new();
        let mut tree = Tree::new(ElementKind::Series, 0);
        tree.begin();
        let id = tree
            .advance(ElementKind::Dropdown, || system.create(&CHOICES, 0))
            .id;
        tree.finish();
        tree[id].layout.region = Region::new(2, 3, 7, 1);
        (tree, system, id)
    }

    fn key(code: Key) -> KeyEvent {
        KeyEvent::plain(code)
    }

    #[test]
    fn keyboard_selection() {
        let (tree, mut system, id) = setup();
        let state = tree[id].state;
        assert_eq!(system.key_event(&tree, id, &key(Key::Enter)), EventOutcome::Redraw);
        assert!(system.state(state).open);
        system.key_event(&tree, id, &key(Key::Down));
        system.key_event(&tree, id, &key(Key::Down));
        system.key_event(&tree, id, &key(Key::Down));
        assert_eq!(system.state(state).highlighted, 2);
        system.key_event(&tree, id, &key(Key::Up));
        assert_eq!(system.key_event(&tree, id, &key(Key::Enter)), EventOutcome::Changed);
        assert_eq!(system.state(state).selected, 1);
        assert!(!system.state(state).open);
        assert!(system.take_picked(state));
        assert!(!system.take_picked(state));
    }

    #[test]
    fn escape_closes_without_picking() {
        let (tree, mut system, id) = setup();
        let state = tree[id].state;
        system.key_event(&tree, id, &key(Key::Down));
        system.key_event(&tree, id, &key(Key::Down));
        assert_eq!(system.key_event(&tree, id, &key(Key::Escape)), EventOutcome::Redraw);
        assert_eq!(system.state(state).selected, 0);
        assert!(!system.take_picked(state));
    }

    #[test]
    fn mouse_opens_then_picks_a_row() {
        let (tree, mut system, id) = setup();
        let state = tree[id].state;
        let click = MouseEvent::click(0, 0);
        system.mouse_event(&tree, id, &click, Offset::new(1, 0));
        assert_eq!(
            system.overlay_region(&tree, id),
            Some(Region::new(2, 4, 7, 3))
        );
        let outcome = system.mouse_event(&tree, id, &click, Offset::new(1, 3));
        assert_eq!(outcome, EventOutcome::Changed);
        assert_eq!(system.state(state).selected, 2);
        assert_eq!(system.overlay_region(&tree, id), None);
    }

    #[test]
    fn picking_the_current_choice_is_not_a_change() {
        let (tree, mut system, id) = setup();
        let click = MouseEvent::click(0, 0);
        system.mouse_event(&tree, id, &click, Offset::ZERO);
        let outcome = system.mouse_event(&tree, id, &click, Offset::new(0, 1));
        assert_eq!(outcome, EventOutcome::Redraw);
    }

    #[test]
    fn shrinking_choices_clamps_selection() {
        let mut system = DropdownSystem::new();
        let s = system.create(&CHOICES, 2);
        let var = Variable::from_id(Default::default());
        assert!(system.update(s, &["a"], var));
        assert_eq!(system.state(s).selected, 0);
        assert!(!system.update(s, &["a"], var));
        system.sync(s, 9);
        assert_eq!(system.state(s).selected, 0);
    }
}

//! TextBox: word-wrapped multi-line text.

use crate::geometry::{Offset, Size};
use crate::storage::SlotStorage;
use crate::text::{display_width, measure_or_zero, wrap_lines, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::DynamicWeight;
use super::system::{ElementSystem, RenderContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBoxState {
    pub content: String,
    /// Wrap width in cells.
    pub max_width: i32,
    lines: Vec<String>,
}

/// System for [`ElementKind::TextBox`](crate::tree::ElementKind::TextBox) nodes.
#[derive(Debug, Default)]
pub struct TextBoxSystem {
    states: SlotStorage<TextBoxState>,
}

impl TextBoxSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, content: &str, max_width: i32) -> usize {
        self.states.emplace(TextBoxState {
            content: content.to_owned(),
            max_width,
            lines: Vec::new(),
        })
    }

    /// Apply this frame's declaration. Returns whether it differs.
    pub fn update(&mut self, state: usize, content: &str, max_width: i32) -> bool {
        let current = &mut self.states[state];
        if current.content == content && current.max_width == max_width {
            return false;
        }
        current.content = content.to_owned();
        current.max_width = max_width;
        true
    }

    /// The wrapped lines as of the last layout.
    pub fn lines(&self, state: usize) -> &[String] {
        &self.states[state].lines
    }
}

impl ElementSystem for TextBoxSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, metrics: &dyn TextMeasure) {
        let state = &mut self.states[tree[node].state];
        state.lines = wrap_lines(&state.content, state.max_width);
        let measured = measure_or_zero(metrics, &state.content, Some(state.max_width));
        let layout = &mut tree[node].layout;
        // Never narrower than the widest wrapped line the box will draw.
        let widest = state.lines.iter().map(|l| display_width(l)).max().unwrap_or(0) as i32;
        layout.fixed_size = Size::new(
            measured.width.max(widest).min(state.max_width.max(1)),
            measured.height.max(state.lines.len() as i32),
        );
        layout.dynamic = DynamicWeight::NONE;
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        let region = tree[node].layout.region;
        let style = ctx.theme.text.clone();
        for (i, line) in state.lines.iter().enumerate() {
            ctx.text(region.origin() + Offset::new(0, i as i32), line, &style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::CellMetrics;
    use crate::tree::ElementKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_to_max_width() {
        let mut system = TextBoxSystem::new();
        let mut tree = Tree::new(ElementKind::Series, 0);
        tree.begin();
        let id = tree
            .advance(ElementKind::TextBox, || system.create("the quick brown fox", 10))
            .id;
        tree.finish();
        system.set_layout_input(&mut tree, id, &CellMetrics);

        let state = tree[id].state;
        assert_eq!(system.lines(state), ["the quick", "brown fox"]);
        assert_eq!(tree[id].layout.fixed_size, Size::new(9, 2));
    }

    #[test]
    fn update_detects_width_change() {
        let mut system = TextBoxSystem::new();
        let s = system.create("text", 10);
        assert!(!system.update(s, "text", 10));
        assert!(system.update(s, "text", 2));
    }
}

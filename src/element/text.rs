//! Text: a plain label.

use crate::geometry::Offset;
use crate::render::CellStyle;
use crate::storage::SlotStorage;
use crate::text::{measure_or_zero, TextMeasure};
use crate::tree::{NodeId, Tree};

use super::layout::DynamicWeight;
use super::system::{ElementSystem, RenderContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextState {
    pub content: String,
    /// Overrides the theme's text style.
    pub style: Option<CellStyle>,
}

/// System for [`ElementKind::Text`](crate::tree::ElementKind::Text) nodes.
#[derive(Debug, Default)]
pub struct TextSystem {
    states: SlotStorage<TextState>,
}

impl TextSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, content: &str, style: Option<CellStyle>) -> usize {
        self.states.emplace(TextState {
            content: content.to_owned(),
            style,
        })
    }

    /// Apply this frame's declaration. Returns whether it differs.
    pub fn update(&mut self, state: usize, content: &str, style: Option<&CellStyle>) -> bool {
        let current = &mut self.states[state];
        if current.content == content && current.style.as_ref() == style {
            return false;
        }
        current.content.clear();
        current.content.push_str(content);
        current.style = style.cloned();
        true
    }

    pub fn content(&self, state: usize) -> &str {
        &self.states[state].content
    }
}

impl ElementSystem for TextSystem {
    fn len(&self) -> usize {
        self.states.len()
    }

    fn pop(&mut self, state: usize) {
        self.states.pop(state);
    }

    fn set_layout_input(&mut self, tree: &mut Tree, node: NodeId, metrics: &dyn TextMeasure) {
        let size = measure_or_zero(metrics, &self.states[tree[node].state].content, None);
        let layout = &mut tree[node].layout;
        layout.fixed_size = size;
        layout.dynamic = DynamicWeight::NONE;
    }

    fn render(&self, tree: &Tree, node: NodeId, ctx: &mut RenderContext<'_>) {
        let state = &self.states[tree[node].state];
        let region = tree[node].layout.region;
        let style = match &state.style {
            Some(style) => ctx.theme.text.patch(style),
            None => ctx.theme.text.clone(),
        };
        for (i, line) in state.content.split('\n').enumerate() {
            ctx.text(region.origin() + Offset::new(0, i as i32), line, &style);
        }
    }
}

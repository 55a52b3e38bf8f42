//! Declaration calls: containers and leaves.
//!
//! Every call claims the next position under the open container. Containers
//! come in `*_begin` / `*_end` pairs; `*_begin` returns whether the body must
//! run, and `*_end` is only called when it did. A skipped body keeps its
//! children as they were.

use std::fmt::Display;
use std::str::FromStr;

use tracing::trace;

use crate::data::{DataGraph, Reads, Variable};
use crate::element::floating::FloatingConfig;
use crate::element::text_input::{Commit, TextInputConfig};
use crate::element::viewport::Canvas;
use crate::element::SeriesConfig;
use crate::geometry::{Offset, Size};
use crate::platform::Backend;
use crate::render::CellStyle;
use crate::tree::{Dirty, ElementKind, NodeId, Reconciled};

use super::Gui;

impl<B: Backend> Gui<B> {
    // -- containers --------------------------------------------------------

    /// Open a series container.
    pub fn series_begin(&mut self, config: &SeriesConfig) -> bool {
        let systems = &mut self.systems;
        let reconciled = self
            .tree
            .advance(ElementKind::Series, || systems.series.create(config.clone()));
        let (id, state, created) = self.claim(reconciled);
        let changed = !created && self.systems.series.update(state, config);
        if changed {
            self.relaid(id);
        }
        self.open(id, created, changed)
    }

    pub fn series_end(&mut self) {
        self.close(ElementKind::Series);
    }

    /// A series container around `body`.
    pub fn series(&mut self, config: &SeriesConfig, body: impl FnOnce(&mut Self)) {
        if self.series_begin(config) {
            body(self);
            self.series_end();
        }
    }

    /// Open a container whose children exist only while `shown` holds.
    ///
    /// Hiding prunes the children with their state and variables; showing
    /// again starts them fresh.
    pub fn optional_begin(&mut self, shown: bool) -> bool {
        let systems = &mut self.systems;
        let reconciled = self
            .tree
            .advance(ElementKind::Optional, || systems.optional.create(shown));
        let (id, state, created) = self.claim(reconciled);
        let changed = !created && self.systems.optional.update(state, shown);
        if changed {
            self.relaid(id);
        }
        if !shown {
            self.collapse(id, None);
            return false;
        }
        self.open(id, created, changed)
    }

    pub fn optional_end(&mut self) {
        self.close(ElementKind::Optional);
    }

    pub fn optional(&mut self, shown: bool, body: impl FnOnce(&mut Self)) {
        if self.optional_begin(shown) {
            body(self);
            self.optional_end();
        }
    }

    /// Open a floating window, shown while `open` holds.
    ///
    /// The window leaves the flow of its parent and is drawn above the main
    /// layer. Escape writes `false` to `open`.
    pub fn floating_begin(&mut self, open: Variable<bool>, config: &FloatingConfig) -> bool {
        let is_open = *self.data.peek(open);
        let systems = &mut self.systems;
        let reconciled = self.tree.advance(ElementKind::Floating, || {
            systems.floating.create(config, is_open)
        });
        let (id, state, created) = self.claim(reconciled);
        let changed = self.systems.floating.update(state, config, is_open, open) && !created;
        if changed {
            self.relaid(id);
        }
        if !is_open {
            self.collapse(id, Some(open));
            return false;
        }
        if !self.open(id, created, changed) {
            return false;
        }
        self.data.depend(open, id);
        true
    }

    pub fn floating_end(&mut self) {
        self.close(ElementKind::Floating);
    }

    pub fn floating(
        &mut self,
        open: Variable<bool>,
        config: &FloatingConfig,
        body: impl FnOnce(&mut Self),
    ) {
        if self.floating_begin(open, config) {
            body(self);
            self.floating_end();
        }
    }

    // -- leaves ------------------------------------------------------------

    /// A line of text.
    pub fn text(&mut self, content: &str) {
        self.text_with(content, None);
    }

    /// A line of text drawn with `style` over the theme's text style.
    pub fn styled_text(&mut self, content: &str, style: &CellStyle) {
        self.text_with(content, Some(style));
    }

    fn text_with(&mut self, content: &str, style: Option<&CellStyle>) {
        let systems = &mut self.systems;
        let reconciled = self
            .tree
            .advance(ElementKind::Text, || systems.text.create(content, style.cloned()));
        let (id, state, created) = self.claim(reconciled);
        if !created && self.systems.text.update(state, content, style) {
            self.restyled(id);
        }
        self.tree.clean(id, Dirty::SELF | Dirty::CHILD);
    }

    /// Text wrapped at word boundaries to at most `max_width` columns.
    pub fn text_box(&mut self, content: &str, max_width: i32) {
        let systems = &mut self.systems;
        let reconciled = self.tree.advance(ElementKind::TextBox, || {
            systems.text_box.create(content, max_width)
        });
        let (id, state, created) = self.claim(reconciled);
        if !created && self.systems.text_box.update(state, content, max_width) {
            self.restyled(id);
        }
        self.tree.clean(id, Dirty::SELF | Dirty::CHILD);
    }

    /// A push button. Returns true on the frame after it was activated.
    pub fn button(&mut self, label: &str) -> bool {
        let systems = &mut self.systems;
        let reconciled = self
            .tree
            .advance(ElementKind::Button, || systems.button.create(label));
        let (id, state, created) = self.claim(reconciled);
        if !created && self.systems.button.update(state, label) {
            self.restyled(id);
        }
        self.tree.clean(id, Dirty::SELF);
        self.systems.button.take_clicked(state)
    }

    /// A checkbox bound to `checked`. Returns the new value on the frame
    /// after the user toggled it.
    pub fn checkbox(&mut self, label: &str, checked: Variable<bool>) -> Option<bool> {
        let (systems, data) = (&mut self.systems, &self.data);
        let reconciled = self.tree.advance(ElementKind::Checkbox, || {
            systems.checkbox.create(label, *data.peek(checked))
        });
        let (id, state, created) = self.claim(reconciled);
        let rebound = self.systems.checkbox.state(state).bound != Some(checked);
        if self.systems.checkbox.update(state, label, checked) && !created {
            self.restyled(id);
        }
        if self.needs_read(id, created, rebound) {
            let value = self.read_leaf(id, created, checked, |v| *v);
            self.systems.checkbox.sync(state, value);
        }
        self.systems
            .checkbox
            .take_toggled(state)
            .then(|| self.systems.checkbox.state(state).checked)
    }

    /// A one-line text field bound to `value`. Every edit is written back;
    /// returns the new text on the frame after an edit.
    pub fn text_input(&mut self, value: Variable<String>, config: &TextInputConfig) -> Option<String> {
        let (systems, data) = (&mut self.systems, &self.data);
        let reconciled = self.tree.advance(ElementKind::TextInput, || {
            systems.text_input.create(config, data.peek(value).as_str())
        });
        let (id, state, created) = self.claim(reconciled);
        let rebound = self.systems.text_input.state(state).bound != Some(value.id());
        let commit: Commit = Box::new(move |data: &mut DataGraph, text: &str| {
            Some(data.write(value, text.to_owned()))
        });
        if self.systems.text_input.update(state, config, value.id(), commit) && !created {
            self.restyled(id);
        }
        if self.needs_read(id, created, rebound) {
            let current = self.read_leaf(id, created, value, String::clone);
            self.systems
                .text_input
                .sync(state, &current, |buffer| buffer == current);
        }
        self.systems
            .text_input
            .take_edited(state)
            .then(|| self.systems.text_input.state(state).buffer.value().to_owned())
    }

    /// A text field bound to a parsed value.
    ///
    /// Text that does not parse is kept on screen, marked invalid and not
    /// written. Returns the new value on the frame after a valid edit.
    pub fn number_input<T>(&mut self, value: Variable<T>, config: &TextInputConfig) -> Option<T>
    where
        T: FromStr + Display + PartialEq + Clone + 'static,
    {
        let (systems, data) = (&mut self.systems, &self.data);
        let reconciled = self.tree.advance(ElementKind::TextInput, || {
            systems.text_input.create(config, &data.peek(value).to_string())
        });
        let (id, state, created) = self.claim(reconciled);
        let rebound = self.systems.text_input.state(state).bound != Some(value.id());
        let commit: Commit = Box::new(move |data: &mut DataGraph, text: &str| {
            let parsed = text.trim().parse::<T>().ok()?;
            Some(data.write(value, parsed))
        });
        if self.systems.text_input.update(state, config, value.id(), commit) && !created {
            self.restyled(id);
        }
        if self.needs_read(id, created, rebound) {
            let current = self.read_leaf(id, created, value, T::clone);
            let text = current.to_string();
            self.systems.text_input.sync(state, &text, |buffer| {
                buffer.trim().parse::<T>().ok().as_ref() == Some(&current)
            });
        }
        if self.systems.text_input.take_edited(state) {
            Some(self.data.peek(value).clone())
        } else {
            None
        }
    }

    /// A drop-down list bound to the selected index. Returns the new index
    /// on the frame after the user picked a choice.
    pub fn dropdown(&mut self, selected: Variable<usize>, choices: &[&str]) -> Option<usize> {
        let (systems, data) = (&mut self.systems, &self.data);
        let reconciled = self.tree.advance(ElementKind::Dropdown, || {
            systems.dropdown.create(choices, *data.peek(selected))
        });
        let (id, state, created) = self.claim(reconciled);
        let rebound = self.systems.dropdown.state(state).bound != Some(selected);
        if self.systems.dropdown.update(state, choices, selected) && !created {
            self.restyled(id);
        }
        if self.needs_read(id, created, rebound) {
            let index = self.read_leaf(id, created, selected, |v| *v);
            self.systems.dropdown.sync(state, index);
        }
        self.systems
            .dropdown
            .take_picked(state)
            .then(|| self.systems.dropdown.state(state).selected)
    }

    /// A fixed-size cell canvas drawn by `paint`.
    ///
    /// `paint` runs when the viewport is created or resized and whenever a
    /// variable it read through [`Reads`] changes. Returns the clicked cell on
    /// the frame after a click.
    pub fn viewport(
        &mut self,
        size: Size,
        paint: impl FnOnce(&mut Canvas, &mut Reads<'_>),
    ) -> Option<Offset> {
        let systems = &mut self.systems;
        let reconciled = self
            .tree
            .advance(ElementKind::Viewport, || systems.viewport.create(size));
        let (id, state, created) = self.claim(reconciled);
        let resized = !created && self.systems.viewport.resize(state, size);
        if resized {
            self.restyled(id);
        }
        if created || resized || self.tree.is_dirty(id, Dirty::SELF) {
            self.data.begin_evaluation(id);
            let canvas = self.systems.viewport.canvas_mut(state);
            paint(canvas, &mut Reads::new(&mut self.data, id));
            self.data.end_evaluation(id);
            self.tree.clean(id, Dirty::SELF);
            if !created {
                self.stats.evaluated += 1;
            }
            self.needs_render = true;
        }
        self.systems.viewport.take_clicked(state)
    }

    // -- bookkeeping -------------------------------------------------------

    /// Account for the outcome of [`advance`](crate::tree::Tree::advance).
    fn claim(&mut self, reconciled: Reconciled) -> (NodeId, usize, bool) {
        let Reconciled {
            id,
            created,
            moved,
            removed,
        } = reconciled;
        self.release(removed);
        if moved {
            self.structure_changed = true;
            self.needs_render = true;
        }
        if created {
            self.stats.created += 1;
            self.structure_changed = true;
            self.needs_render = true;
        }
        (id, self.tree[id].state, created)
    }

    /// A container's own configuration changed.
    fn relaid(&mut self, id: NodeId) {
        self.tree.mark_layout(id);
        self.needs_render = true;
    }

    /// A leaf's declaration changed.
    fn restyled(&mut self, id: NodeId) {
        self.relaid(id);
        self.stats.evaluated += 1;
    }

    /// Enter a container's body when it must run.
    fn open(&mut self, id: NodeId, created: bool, changed: bool) -> bool {
        if !(created || changed || self.tree.is_dirty(id, Dirty::SELF | Dirty::CHILD)) {
            trace!(?id, "container skipped");
            return false;
        }
        if !created {
            self.stats.evaluated += 1;
        }
        self.tree.clean(id, Dirty::SELF | Dirty::CHILD);
        self.tree.descend();
        self.data.begin_evaluation(id);
        self.evaluating.push((id, 0));
        true
    }

    fn close(&mut self, kind: ElementKind) {
        assert!(
            self.evaluating.len() > 1,
            "unbalanced container nesting: close without a matching open"
        );
        let Some((id, _)) = self.evaluating.pop() else {
            return;
        };
        let open_kind = self.tree[id].kind;
        assert!(
            open_kind == kind,
            "unbalanced container nesting: {open_kind:?} closed as {kind:?}"
        );
        let removed = self.tree.ascend();
        self.release(removed);
        self.data.end_evaluation(id);
    }

    /// Drop a hidden container's children, its variables and its
    /// dependencies, except on `keep`.
    fn collapse(&mut self, id: NodeId, keep: Option<Variable<bool>>) {
        self.tree.clean(id, Dirty::SELF | Dirty::CHILD);
        self.data.remove_node(id);
        if let Some(var) = keep {
            self.data.depend(var, id);
        }
        if self.tree[id].has_children() {
            self.tree.descend();
            let removed = self.tree.ascend();
            self.release(removed);
        }
    }

    fn needs_read(&self, id: NodeId, created: bool, rebound: bool) -> bool {
        created || rebound || self.tree.is_dirty(id, Dirty::SELF)
    }

    /// Re-read a bound leaf's variable as the leaf.
    fn read_leaf<T: 'static, R>(
        &mut self,
        id: NodeId,
        created: bool,
        var: Variable<T>,
        f: impl FnOnce(&T) -> R,
    ) -> R {
        self.data.begin_evaluation(id);
        let out = f(self.data.read(var, id).0);
        self.data.end_evaluation(id);
        self.tree.clean(id, Dirty::SELF);
        if !created {
            self.stats.evaluated += 1;
        }
        self.needs_render = true;
        out
    }
}

//! The frame driver.
//!
//! A [`Gui`] owns the retained tree, the element systems, the data graph and
//! a platform backend. Caller code runs once per frame between
//! [`Gui::begin_frame`] and [`Gui::end_frame`] and declares the interface
//! with container and leaf calls (see [`declare`]). The driver matches those
//! calls against the previous frame, skips container bodies whose inputs did
//! not change, lays out what moved, routes input (see [`dispatch`]) and
//! redraws.
//!
//! ```no_run
//! use arbor::prelude::*;
//!
//! let mut gui = Gui::terminal(GuiConfig::new().with_title("counter"))?;
//! while gui.begin_frame() {
//!     let count = gui.variable(|| 0u32);
//!     let shown = *gui.get(count);
//!     gui.text(&format!("pressed {shown} times"));
//!     if gui.button("press") {
//!         gui.update(count, |n| *n += 1);
//!     }
//!     gui.end_frame();
//! }
//! # Ok::<(), arbor::GuiError>(())
//! ```

mod declare;
mod dispatch;

use tracing::{debug, error, info};

use crate::config::GuiConfig;
use crate::data::{DataGraph, Variable};
use crate::element::layout::{self, LayoutStats};
use crate::element::paint::{paint, paint_order};
use crate::element::{SeriesConfig, Systems};
use crate::error::GuiError;
use crate::event::InputEvent;
use crate::focus::FocusChain;
use crate::geometry::{Region, Size};
use crate::platform::{Backend, HeadlessBackend, TerminalBackend};
use crate::render::Compositor;
use crate::text::{CellMetrics, TextMeasure};
use crate::tree::{Dirty, ElementKind, NodeId, Removed, Tree};

// ---------------------------------------------------------------------------
// FrameStats
// ---------------------------------------------------------------------------

/// Work done by the latest frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Nodes created by declarations.
    pub created: usize,
    /// Nodes pruned, including whole subtrees.
    pub destroyed: usize,
    /// Container bodies run and bound leaves re-read. The root, which runs
    /// every frame, and freshly created nodes are not counted.
    pub evaluated: usize,
    pub layout: LayoutStats,
    /// Input events dispatched.
    pub events: usize,
    /// Whether the frame was drawn.
    pub rendered: bool,
    /// Whether any variable was written.
    pub data_changed: bool,
}

// ---------------------------------------------------------------------------
// Gui
// ---------------------------------------------------------------------------

fn cells(n: i32) -> u16 {
    u16::try_from(n.max(0)).unwrap_or(u16::MAX)
}

/// The root container: a vertical series filling the window that scrolls
/// when its content does not fit.
fn root_config(config: &GuiConfig) -> SeriesConfig {
    SeriesConfig::vertical()
        .fill(1)
        .padding(config.padding)
        .spacing(config.spacing)
        .scrollable()
}

/// One window of declarative interface over a [`Backend`].
pub struct Gui<B: Backend> {
    backend: B,
    config: GuiConfig,
    tree: Tree,
    systems: Systems,
    data: DataGraph,
    focus: FocusChain,
    metrics: Box<dyn TextMeasure>,
    compositor: Compositor,
    window: Region,
    /// Input received but not dispatched yet.
    events: Vec<InputEvent>,
    /// Containers whose bodies are running, innermost last, each with the
    /// number of variables it declared so far this frame.
    evaluating: Vec<(NodeId, usize)>,
    /// Custom binding actions fired by the previous frame's input.
    triggered: Vec<String>,
    hovered: Option<NodeId>,
    running: bool,
    in_frame: bool,
    needs_render: bool,
    structure_changed: bool,
    stats: FrameStats,
}

impl Gui<TerminalBackend> {
    /// A GUI in the controlling terminal.
    pub fn terminal(config: GuiConfig) -> Result<Self, GuiError> {
        let backend = TerminalBackend::new(config.title.as_deref())?;
        Self::new(backend, config)
    }
}

impl Gui<HeadlessBackend> {
    /// A GUI without a terminal, for tests and tooling.
    pub fn headless(width: u16, height: u16, config: GuiConfig) -> Self {
        let size = Size::new(i32::from(width), i32::from(height));
        Self::with_size(HeadlessBackend::new(width, height), size, config)
    }
}

impl<B: Backend> Gui<B> {
    pub fn new(backend: B, config: GuiConfig) -> Result<Self, GuiError> {
        let size = backend.window_size()?;
        Ok(Self::with_size(backend, size, config))
    }

    fn with_size(backend: B, size: Size, config: GuiConfig) -> Self {
        let mut systems = Systems::new(config.scroll_step);
        let root_state = systems.series.create(root_config(&config));
        let tree = Tree::new(ElementKind::Series, root_state);
        info!(width = size.width, height = size.height, "gui started");
        Self {
            backend,
            tree,
            systems,
            data: DataGraph::new(),
            focus: FocusChain::new(),
            metrics: Box::new(CellMetrics),
            compositor: Compositor::new(cells(size.width), cells(size.height)),
            window: size.to_region(),
            events: Vec::new(),
            evaluating: Vec::new(),
            triggered: Vec::new(),
            hovered: None,
            running: true,
            in_frame: false,
            needs_render: true,
            structure_changed: false,
            stats: FrameStats::default(),
            config,
        }
    }

    /// Measure text with `metrics` instead of terminal display widths.
    pub fn with_metrics(mut self, metrics: impl TextMeasure + 'static) -> Self {
        self.metrics = Box::new(metrics);
        self.tree.mark_layout(self.tree.root());
        self
    }

    // -- accessors ---------------------------------------------------------

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn systems(&self) -> &Systems {
        &self.systems
    }

    pub fn data(&self) -> &DataGraph {
        &self.data
    }

    /// The drawn screen, as of the latest rendered frame.
    pub fn screen(&self) -> &Compositor {
        &self.compositor
    }

    pub fn window(&self) -> Region {
        self.window
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Whether the loop should keep going.
    pub fn running(&self) -> bool {
        self.running
    }

    /// Stop after the current frame.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Whether the custom binding `name` fired since the previous frame.
    pub fn triggered(&self, name: &str) -> bool {
        self.triggered.iter().any(|t| t == name)
    }

    /// Move keyboard focus to `node`, or clear it.
    pub fn focus(&mut self, node: Option<NodeId>) {
        self.set_focus(node);
    }

    /// Collect pending input without waiting. Events are dispatched at the end
    /// of the next frame.
    pub fn poll(&mut self) -> Result<usize, GuiError> {
        let events = self.backend.poll_events(std::time::Duration::ZERO)?;
        let count = events.len();
        self.events.extend(events);
        Ok(count)
    }

    // -- frame lifecycle ---------------------------------------------------

    /// Wait for input or a pending update, then open a frame.
    ///
    /// Returns `Ok(false)` once the GUI has stopped. The wait is skipped when
    /// something is already dirty, and bounded by the configured frame rate
    /// otherwise.
    ///
    /// # Panics
    ///
    /// Panics when a frame is already open.
    pub fn try_begin_frame(&mut self) -> Result<bool, GuiError> {
        assert!(!self.in_frame, "begin_frame called while a frame is open");
        let root = self.tree.root();
        let busy = self.needs_render
            || !self.events.is_empty()
            || self.tree.is_dirty(root, Dirty::SELF | Dirty::CHILD | Dirty::LAYOUT);
        let timeout = if busy {
            std::time::Duration::ZERO
        } else {
            self.config.poll_timeout()
        };
        let events = self.backend.poll_events(timeout)?;
        self.events.extend(events);

        let size = self.backend.window_size()?;
        if size != self.window.size() {
            self.resize(size);
        }
        if !self.running {
            return Ok(false);
        }

        self.tree.begin();
        self.stats = FrameStats {
            frame: self.tree.frame(),
            ..FrameStats::default()
        };
        self.tree.clean(root, Dirty::SELF | Dirty::CHILD);
        self.data.begin_evaluation(root);
        self.evaluating.push((root, 0));
        self.in_frame = true;
        Ok(true)
    }

    /// [`try_begin_frame`](Self::try_begin_frame) that stops the GUI on
    /// backend failure instead of returning the error.
    pub fn begin_frame(&mut self) -> bool {
        match self.try_begin_frame() {
            Ok(open) => open,
            Err(err) => {
                error!(%err, "backend failed, stopping");
                self.running = false;
                false
            }
        }
    }

    /// Close the frame: prune what was not declared, lay out, dispatch the
    /// input received since the previous frame and redraw.
    ///
    /// # Panics
    ///
    /// Panics without a matching [`begin_frame`](Self::begin_frame) or when
    /// containers are still open.
    pub fn end_frame(&mut self) {
        assert!(self.in_frame, "end_frame called without a matching begin_frame");
        let root = self.tree.root();
        let removed = self.tree.finish();
        self.release(removed);
        self.data.end_evaluation(root);
        self.evaluating.clear();
        self.in_frame = false;

        if std::mem::take(&mut self.structure_changed) {
            if let Some(lost) = self.focus.rebuild(&self.tree, &self.systems) {
                if self.tree.contains(lost) {
                    self.systems.focus_leave(&self.tree, lost);
                }
            }
        }
        self.relayout();
        self.dispatch_events();
        if self.tree.is_dirty(root, Dirty::LAYOUT) {
            self.relayout();
        }

        if let Err(err) = self.render() {
            error!(%err, "presenting the frame failed, stopping");
            self.running = false;
        }
        self.stats.data_changed = self.data.settle();

        let stats = &self.stats;
        if stats.created + stats.destroyed + stats.evaluated + stats.events > 0 {
            debug!(
                frame = stats.frame,
                created = stats.created,
                destroyed = stats.destroyed,
                evaluated = stats.evaluated,
                events = stats.events,
                "frame"
            );
        }
    }

    /// Run one frame with `body` as the declaration.
    pub fn frame(&mut self, body: impl FnOnce(&mut Self)) -> bool {
        if !self.begin_frame() {
            return false;
        }
        body(self);
        self.end_frame();
        true
    }

    // -- data --------------------------------------------------------------

    /// The next variable owned by the innermost running container, created
    /// from `init` on its first declaration.
    ///
    /// Variables are matched by declaration order within their owner, like
    /// unkeyed nodes, and die with the owner.
    ///
    /// # Panics
    ///
    /// Panics outside of a frame.
    pub fn variable<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Variable<T> {
        let Some((owner, next)) = self.evaluating.last_mut() else {
            panic!("variable declared outside of a frame");
        };
        let index = *next;
        *next += 1;
        let owner = *owner;
        self.data.variable_at(owner, index, init)
    }

    /// Read `var` and make the running container depend on it.
    pub fn get<T: 'static>(&mut self, var: Variable<T>) -> &T {
        let reader = self.reader();
        self.data.read(var, reader).0
    }

    /// Borrow `var` through `f` and depend on it.
    pub fn with<T: 'static, R>(&mut self, var: Variable<T>, f: impl FnOnce(&T) -> R) -> R {
        f(self.get(var))
    }

    /// Whether `var` changed since it was last seen, depending on it.
    pub fn changed<T: 'static>(&mut self, var: Variable<T>) -> bool {
        let reader = self.reader();
        self.data.changed(var, reader)
    }

    /// Re-run the running container whenever `var` changes, without reading it.
    pub fn depend_on<T: 'static>(&mut self, var: Variable<T>) {
        let reader = self.reader();
        self.data.depend(var, reader);
    }

    /// Read `var` without recording a dependency.
    pub fn peek<T: 'static>(&self, var: Variable<T>) -> &T {
        self.data.peek(var)
    }

    /// Replace the value of `var`. Its readers re-run on the next frame.
    pub fn set<T: 'static>(&mut self, var: Variable<T>, value: T) {
        let readers = self.data.write(var, value);
        self.invalidate(readers);
    }

    /// Modify `var` in place. Its readers re-run on the next frame.
    pub fn update<T: 'static>(&mut self, var: Variable<T>, f: impl FnOnce(&mut T)) {
        let readers = self.data.update(var, f);
        self.invalidate(readers);
    }

    /// Key the next declaration so it keeps its state when siblings move.
    ///
    /// # Panics
    ///
    /// Closing the container or the frame with the key still unused panics.
    pub fn key(&mut self, key: impl Into<String>) {
        self.tree.set_key(key);
    }

    // -- internals ---------------------------------------------------------

    fn reader(&self) -> NodeId {
        match self.evaluating.last() {
            Some(&(node, _)) => node,
            None => panic!("dependencies are recorded inside a frame; use peek outside"),
        }
    }

    fn invalidate(&mut self, readers: Vec<NodeId>) {
        for reader in readers {
            self.tree.mark_dirty(reader);
        }
    }

    /// Release the element state and data of pruned nodes.
    fn release(&mut self, removed: Vec<Removed>) {
        if removed.is_empty() {
            return;
        }
        for node in &removed {
            self.systems.pop(node.kind, node.state);
            self.data.remove_node(node.id);
            if self.hovered == Some(node.id) {
                self.hovered = None;
            }
        }
        self.stats.destroyed += removed.len();
        self.structure_changed = true;
        self.needs_render = true;
    }

    fn resize(&mut self, size: Size) {
        debug!(width = size.width, height = size.height, "window resized");
        self.window = size.to_region();
        self.compositor.resize(cells(size.width), cells(size.height));
        self.tree.mark_layout(self.tree.root());
        self.needs_render = true;
    }

    fn relayout(&mut self) {
        let stats = layout::run(
            &mut self.tree,
            &mut self.systems,
            self.metrics.as_ref(),
            self.window,
        );
        if stats.placed > 0 {
            self.needs_render = true;
        }
        self.stats.layout.measured += stats.measured;
        self.stats.layout.placed += stats.placed;
    }

    fn render(&mut self) -> Result<(), GuiError> {
        if !std::mem::take(&mut self.needs_render) {
            return Ok(());
        }
        let steps = paint_order(&self.tree, &self.systems, self.window);
        self.compositor.clear();
        paint(
            &steps,
            &self.tree,
            &self.systems,
            &mut self.compositor,
            &self.config.theme,
            self.focus.focused(),
            self.hovered,
        );
        let updates = self.compositor.present();
        self.stats.rendered = true;
        self.backend.present(&updates)
    }
}

impl<B: Backend> std::fmt::Debug for Gui<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gui")
            .field("window", &self.window)
            .field("nodes", &self.tree.len())
            .field("variables", &self.data.len())
            .field("running", &self.running)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

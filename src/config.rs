//! Frame driver configuration.

use std::time::Duration;

use crate::event::KeyBindingRegistry;
use crate::geometry::Spacing;
use crate::render::Theme;

/// Settings for a [`Gui`](crate::gui::Gui).
#[derive(Debug, Clone)]
pub struct GuiConfig {
    /// Window (terminal) title.
    pub title: Option<String>,
    /// Target frames per second; bounds how long `begin_frame` waits for input.
    pub fps: u32,
    /// Padding of the root container.
    pub padding: Spacing,
    /// Gap between the root container's children.
    pub spacing: i32,
    /// Cells scrolled per wheel notch.
    pub scroll_step: i32,
    pub theme: Theme,
    pub bindings: KeyBindingRegistry,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            title: None,
            fps: 60,
            padding: Spacing::ZERO,
            spacing: 0,
            scroll_step: 1,
            theme: Theme::default(),
            bindings: KeyBindingRegistry::with_defaults(),
        }
    }
}

impl GuiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the target FPS (builder).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the root padding (builder).
    pub fn with_padding(mut self, padding: Spacing) -> Self {
        self.padding = padding;
        self
    }

    /// Set the root spacing (builder).
    pub fn with_spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the wheel scroll step (builder).
    pub fn with_scroll_step(mut self, step: i32) -> Self {
        self.scroll_step = step;
        self
    }

    /// Set the theme (builder).
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Replace the key bindings (builder).
    pub fn with_bindings(mut self, bindings: KeyBindingRegistry) -> Self {
        self.bindings = bindings;
        self
    }

    /// How long one frame waits for input.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

//! Key bindings consulted before any element sees a key.
//!
//! A [`KeyBindingRegistry`] maps a key with its exact modifier set to a
//! [`BindingAction`]. The driver resolves every key event against it first;
//! only unbound keys reach the focused element.

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};

// ---------------------------------------------------------------------------
// BindingAction
// ---------------------------------------------------------------------------

/// What a bound key does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingAction {
    /// Stop the frame loop: `begin_frame` returns `false` from now on.
    Quit,
    FocusNext,
    FocusPrevious,
    /// Close the innermost open dropdown list or focused floating window.
    CloseOverlay,
    /// A named action the application polls with `Gui::triggered`.
    Custom(String),
}

impl BindingAction {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

// ---------------------------------------------------------------------------
// KeyBindingRegistry
// ---------------------------------------------------------------------------

type Chord = (Key, Modifiers);

/// Key chords and the actions they trigger.
#[derive(Debug, Clone, Default)]
pub struct KeyBindingRegistry {
    bindings: HashMap<Chord, BindingAction>,
}

impl KeyBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bindings every [`GuiConfig`](crate::GuiConfig) starts with.
    ///
    /// | Chord | Action |
    /// |---|---|
    /// | `Ctrl+C` | [`Quit`](BindingAction::Quit) |
    /// | `Tab` | [`FocusNext`](BindingAction::FocusNext) |
    /// | `BackTab`, `Shift+BackTab` | [`FocusPrevious`](BindingAction::FocusPrevious) |
    /// | `Escape` | [`CloseOverlay`](BindingAction::CloseOverlay) |
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind(Key::Char('c'), Modifiers::CTRL, BindingAction::Quit);
        registry.bind(Key::Tab, Modifiers::NONE, BindingAction::FocusNext);
        registry.bind(Key::BackTab, Modifiers::NONE, BindingAction::FocusPrevious);
        // crossterm keeps the shift bit on BackTab for some terminals.
        registry.bind(Key::BackTab, Modifiers::SHIFT, BindingAction::FocusPrevious);
        registry.bind(Key::Escape, Modifiers::NONE, BindingAction::CloseOverlay);
        registry
    }

    /// Bind a chord, replacing whatever it was bound to.
    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: BindingAction) {
        self.bindings.insert((key, modifiers), action);
    }

    /// Builder form of [`bind`](Self::bind).
    pub fn with(mut self, key: Key, modifiers: Modifiers, action: BindingAction) -> Self {
        self.bind(key, modifiers, action);
        self
    }

    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) -> Option<BindingAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// The action bound to exactly this key and modifier set.
    pub fn resolve(&self, event: &KeyEvent) -> Option<&BindingAction> {
        self.bindings.get(&(event.code, event.modifiers))
    }

    /// Every chord bound to `action`, in no particular order.
    pub fn chords_for(&self, action: &BindingAction) -> Vec<Chord> {
        self.bindings
            .iter()
            .filter(|(_, bound)| *bound == action)
            .map(|(chord, _)| *chord)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn modifiers_must_match_exactly() {
        let reg = KeyBindingRegistry::new().with(Key::Char('s'), Modifiers::CTRL, BindingAction::custom("save"));
        assert_eq!(reg.resolve(&KeyEvent::plain(Key::Char('s'))), None);
        assert_eq!(
            reg.resolve(&KeyEvent::new(Key::Char('s'), Modifiers::CTRL)),
            Some(&BindingAction::custom("save"))
        );
    }

    #[test]
    fn rebinding_a_chord_replaces_it() {
        let mut reg = KeyBindingRegistry::new();
        reg.bind(Key::F(2), Modifiers::NONE, BindingAction::custom("rename"));
        reg.bind(Key::F(2), Modifiers::NONE, BindingAction::Quit);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.resolve(&KeyEvent::plain(Key::F(2))), Some(&BindingAction::Quit));
        assert_eq!(reg.unbind(Key::F(2), Modifiers::NONE), Some(BindingAction::Quit));
        assert!(reg.is_empty());
    }

    #[test]
    fn default_chords() {
        let reg = KeyBindingRegistry::with_defaults();
        assert_eq!(
            reg.resolve(&KeyEvent::new(Key::Char('c'), Modifiers::CTRL)),
            Some(&BindingAction::Quit)
        );
        assert_eq!(reg.resolve(&KeyEvent::plain(Key::Tab)), Some(&BindingAction::FocusNext));
        assert_eq!(
            reg.resolve(&KeyEvent::plain(Key::Escape)),
            Some(&BindingAction::CloseOverlay)
        );
        let mut back = reg.chords_for(&BindingAction::FocusPrevious);
        back.sort_by_key(|(_, modifiers)| modifiers.bits());
        assert_eq!(
            back,
            vec![(Key::BackTab, Modifiers::NONE), (Key::BackTab, Modifiers::SHIFT)]
        );
    }
}

use crate::action::Action;
use crate::bindings::KeyBindings;
use std::collections::BTreeSet;

/// A flag transition produced by a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Pressed(Action),
    Released(Action),
}

/// Bundle of named boolean flags. A flag is true between its key's down and up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    held: BTreeSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn set(&mut self, action: Action, active: bool) -> bool {
        if active {
            self.held.insert(action)
        } else {
            self.held.remove(&action)
        }
    }

    /// Apply a raw key event. Unknown keys are ignored. Returns an edge only
    /// when the bound flag changed, so OS key repeat produces nothing.
    pub fn handle_key(&mut self, bindings: &KeyBindings, code: &str, pressed: bool) -> Option<KeyEdge> {
        let action = bindings.action_for(code)?;
        if !self.set(action, pressed) {
            return None;
        }
        tracing::trace!(%action, pressed, "input flag changed");
        Some(if pressed {
            KeyEdge::Pressed(action)
        } else {
            KeyEdge::Released(action)
        })
    }

    /// Drop every flag, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Currently held actions, in declaration order.
    pub fn active(&self) -> impl Iterator<Item = Action> + '_ {
        self.held.iter().copied()
    }
}

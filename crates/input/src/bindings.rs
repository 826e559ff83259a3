use crate::action::Action;
use std::collections::HashMap;

/// Physical key name -> action. Key names follow the DOM `KeyboardEvent.code`
/// / winit `KeyCode` debug spelling (`"KeyW"`, `"Space"`, `"Digit1"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: HashMap<String, Action>,
}

impl KeyBindings {
    /// No bindings at all.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind `code` to `action`, replacing any previous binding of that key.
    pub fn bind(&mut self, code: impl Into<String>, action: Action) {
        let code = code.into();
        tracing::debug!(%code, %action, "key bound");
        self.map.insert(code, action);
    }

    pub fn unbind(&mut self, code: &str) -> Option<Action> {
        self.map.remove(code)
    }

    pub fn action_for(&self, code: &str) -> Option<Action> {
        self.map.get(code).copied()
    }

    /// Keys bound to `action`, sorted.
    pub fn keys_for(&self, action: Action) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .map
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| k.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        for (code, action) in [
            ("KeyW", Action::MoveForward),
            ("KeyS", Action::MoveBackward),
            ("KeyA", Action::MoveLeft),
            ("KeyD", Action::MoveRight),
            ("Space", Action::Jump),
            ("Digit1", Action::Slot1),
            ("Digit2", Action::Slot2),
            ("Digit3", Action::Slot3),
            ("Digit4", Action::Slot4),
            ("Digit5", Action::Slot5),
        ] {
            bindings.map.insert(code.to_string(), action);
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let b = KeyBindings::default();
        assert_eq!(b.action_for("KeyW"), Some(Action::MoveForward));
        assert_eq!(b.action_for("Space"), Some(Action::Jump));
        assert_eq!(b.action_for("Digit5"), Some(Action::Slot5));
        assert_eq!(b.action_for("KeyQ"), None);
    }

    #[test]
    fn every_action_has_a_default_key() {
        let b = KeyBindings::default();
        for action in Action::ALL {
            assert_eq!(b.keys_for(action).len(), 1, "{action}");
        }
    }

    #[test]
    fn rebinding() {
        let mut b = KeyBindings::default();
        b.bind("ArrowUp", Action::MoveForward);
        assert_eq!(b.keys_for(Action::MoveForward), vec!["ArrowUp", "KeyW"]);
        assert_eq!(b.unbind("KeyW"), Some(Action::MoveForward));
        assert_eq!(b.action_for("KeyW"), None);
    }
}

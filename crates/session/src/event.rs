use buildspace_common::Material;
use buildspace_kernel::{Interaction, InteractionKind};

/// An external signal delivered to the session. Events are queued as they
/// arrive and dispatched in order at the start of the next update.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Raw key transition by physical key name (`"KeyW"`, `"Digit3"`).
    Key { code: String, pressed: bool },
    /// Pointer-lock mouse delta in pixels.
    Look { dx: f32, dy: f32 },
    /// A click at the crosshair; the session picks the surface itself.
    Click(InteractionKind),
    /// An interaction with an already-resolved surface.
    Interact(Interaction),
    SelectMaterial(Material),
    Undo,
    Redo,
    /// The window lost focus; all held flags are released.
    FocusLost,
}

impl GameEvent {
    pub fn key(code: impl Into<String>, pressed: bool) -> Self {
        Self::Key {
            code: code.into(),
            pressed,
        }
    }
}

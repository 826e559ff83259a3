//! Input State Source: raw keys mapped to named action flags, plus the active
//! material selection.
//!
//! # Invariants
//! - A flag is set on its key's press and cleared on the matching release.
//! - Unknown keys never change state.
//! - Gameplay reads actions, never raw key names.

pub mod action;
pub mod bindings;
pub mod selection;
pub mod state;

pub use action::Action;
pub use bindings::KeyBindings;
pub use selection::MaterialSelection;
pub use state::{InputState, KeyEdge};

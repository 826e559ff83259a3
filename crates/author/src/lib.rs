//! Block authoring: undoable place/remove over the world grid.
//!
//! # Invariants
//! - Every recorded edit is reversible.
//! - Rejected edits leave the world and both stacks unchanged.

pub mod editor;

pub use editor::{EditCommand, EditError, Editor};

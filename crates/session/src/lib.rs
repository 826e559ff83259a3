//! Game session: the single owner of world, input, selection, camera and the
//! player body. External signals arrive as queued events and are applied at a
//! well-defined point in the frame.
//!
//! # Invariants
//! - Queued events are dispatched in arrival order before the simulation steps.
//! - The player advances in fixed ticks; a long frame is capped, not replayed.
//! - Physics colliders always mirror the world grid after dispatch.

mod event;
mod session;

pub use event::GameEvent;
pub use session::{DEMO_BLOCKS, Session, demo_world, move_intent};

//! World Kernel: the authoritative block grid, placement resolution, ray
//! picking and the player's physics body.
//!
//! # Invariants
//! - At most one block per grid position; place and remove are idempotent.
//! - Block iteration order is insertion order and survives unrelated edits.
//! - Every effective grid mutation is recorded as a [`WorldEvent`].
//! - The controller writes velocity; only the physics backend moves the body.

pub mod controller;
pub mod physics;
pub mod placement;
pub mod raycast;
pub mod world;

pub use controller::{MoveIntent, PlayerController};
pub use physics::{PhysicsBackend, SimplePhysics};
pub use placement::{Interaction, InteractionKind, Placement, Surface};
pub use raycast::{GroundPlane, Hit};
pub use world::{Block, World, WorldEvent};

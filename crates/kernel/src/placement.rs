//! Pointer interactions on block faces or the ground, resolved to grid edits.

use crate::world::World;
use buildspace_common::{BlockPos, Face, Material};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The surface a pointer ray struck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Surface {
    /// A face of an existing block. `position` is the block's position as the
    /// physics/render layer reports it, so it may carry float noise.
    BlockFace { position: Vec3, face_index: u8 },
    /// The ground plane at `point`.
    Ground { point: Vec3 },
}

/// Mouse button semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Break the struck block.
    Primary,
    /// Place a block against the struck surface.
    Secondary,
}

/// One discrete pointer interaction. Callers deliver each click once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub surface: Surface,
    pub kind: InteractionKind,
}

/// A resolved grid edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Place(BlockPos),
    Remove(BlockPos),
}

impl Placement {
    pub fn target(&self) -> BlockPos {
        match self {
            Placement::Place(p) | Placement::Remove(p) => *p,
        }
    }
}

/// Resolve an interaction to the edit it asks for.
///
/// Face hits snap to the nearest cell; ground hits snap each component up.
/// Returns `None` for an out-of-range face index or a neighbour past the grid
/// edge (both logged) and for a primary click on the ground, which has nothing
/// to break.
pub fn resolve(interaction: &Interaction) -> Option<Placement> {
    match (interaction.surface, interaction.kind) {
        (Surface::BlockFace { position, .. }, InteractionKind::Primary) => {
            Some(Placement::Remove(BlockPos::round(position)))
        }
        (
            Surface::BlockFace {
                position,
                face_index,
            },
            InteractionKind::Secondary,
        ) => match Face::try_from(face_index) {
            Ok(face) => {
                let target = BlockPos::round(position);
                match target.offset(face) {
                    Some(neighbour) => Some(Placement::Place(neighbour)),
                    None => {
                        tracing::warn!(%target, ?face, "ignoring interaction: neighbour off the grid");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!("ignoring interaction: {e}");
                None
            }
        },
        (Surface::Ground { point }, InteractionKind::Secondary) => {
            Some(Placement::Place(BlockPos::ceil(point)))
        }
        (Surface::Ground { .. }, InteractionKind::Primary) => None,
    }
}

/// Resolve and apply directly to a world. Returns the edit if one was attempted.
pub fn apply(world: &mut World, interaction: &Interaction, material: Material) -> Option<Placement> {
    let placement = resolve(interaction)?;
    match placement {
        Placement::Place(p) => {
            world.place(p, material);
        }
        Placement::Remove(p) => {
            world.remove(p);
        }
    }
    Some(placement)
}

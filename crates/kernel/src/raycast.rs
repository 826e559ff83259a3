//! Picking: which surface does a view ray hit first?
//!
//! Walks the block grid with a voxel DDA (cells are centred on integers) and
//! compares the first occupied cell against the ground-plane intersection.

use crate::placement::Surface;
use crate::world::World;
use buildspace_common::{BlockPos, Face};
use glam::{IVec3, Vec3};

/// A pick result with the distance along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub surface: Surface,
    pub distance: f32,
}

/// The ground plane as seen by the picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub height: f32,
    pub half_extent: f32,
}

/// Cells visited along a ray, with the face crossed to enter each one and the
/// distance at which it was entered. The starting cell is not yielded.
struct GridWalk {
    current: IVec3,
    step: IVec3,
    t_max: Vec3,
    t_delta: Vec3,
    max_distance: f32,
}

impl GridWalk {
    fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        // Shift so that cell boundaries fall on integers.
        let shifted = origin + Vec3::splat(0.5);
        let current = shifted.floor().as_ivec3();
        let sign = |v: f32| {
            if v > 0.0 {
                1
            } else if v < 0.0 {
                -1
            } else {
                0
            }
        };
        let step = IVec3::new(sign(direction.x), sign(direction.y), sign(direction.z));

        let mut t_max = Vec3::splat(f32::INFINITY);
        let mut t_delta = Vec3::splat(f32::INFINITY);
        for axis in 0..3 {
            if direction[axis] != 0.0 {
                let boundary = if step[axis] > 0 {
                    current[axis] as f32 + 1.0
                } else {
                    current[axis] as f32
                };
                t_max[axis] = (boundary - shifted[axis]) / direction[axis];
                t_delta[axis] = 1.0 / direction[axis].abs();
            }
        }

        Self {
            current,
            step,
            t_max,
            t_delta,
            max_distance,
        }
    }
}

impl Iterator for GridWalk {
    type Item = (BlockPos, Face, f32);

    fn next(&mut self) -> Option<Self::Item> {
        let axis = if self.t_max.x <= self.t_max.y && self.t_max.x <= self.t_max.z {
            0
        } else if self.t_max.y <= self.t_max.z {
            1
        } else {
            2
        };
        let distance = self.t_max[axis];
        if !distance.is_finite() || distance > self.max_distance {
            return None;
        }
        self.current[axis] += self.step[axis];
        self.t_max[axis] += self.t_delta[axis];

        // Entering while moving +axis means we crossed the cell's negative face.
        let face = match (axis, self.step[axis] > 0) {
            (0, true) => Face::NegX,
            (0, false) => Face::PosX,
            (1, true) => Face::NegY,
            (1, false) => Face::PosY,
            (_, true) => Face::NegZ,
            (_, false) => Face::PosZ,
        };
        Some((BlockPos::from(self.current), face, distance))
    }
}

/// Nearest surface along `direction` from `origin` within `max_distance`.
///
/// Only one surface is ever returned, so a single click cannot be handled by
/// both a block and the ground behind it.
pub fn pick(
    world: &World,
    ground: GroundPlane,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<Hit> {
    let direction = direction.try_normalize()?;

    let block_hit = GridWalk::new(origin, direction, max_distance)
        .find(|(cell, _, _)| world.contains(*cell))
        .map(|(cell, face, distance)| Hit {
            surface: Surface::BlockFace {
                position: cell.center(),
                face_index: face.index(),
            },
            distance,
        });

    let ground_hit = ground_intersection(ground, origin, direction, max_distance);

    match (block_hit, ground_hit) {
        (Some(b), Some(g)) => Some(if g.distance < b.distance { g } else { b }),
        (b, g) => b.or(g),
    }
}

fn ground_intersection(
    ground: GroundPlane,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<Hit> {
    // Only hittable from above.
    if direction.y >= 0.0 || origin.y <= ground.height {
        return None;
    }
    let distance = (ground.height - origin.y) / direction.y;
    if distance > max_distance {
        return None;
    }
    let point = origin + direction * distance;
    if point.x.abs() > ground.half_extent || point.z.abs() > ground.half_extent {
        return None;
    }
    Some(Hit {
        surface: Surface::Ground { point },
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspace_common::Material;

    const GROUND: GroundPlane = GroundPlane {
        height: -0.5,
        half_extent: 50.0,
    };

    #[test]
    fn hits_near_face_of_block_ahead() {
        let world = World::with_blocks([(BlockPos::new(0, 0, -3), Material::Dirt)]);
        let hit = pick(&world, GROUND, Vec3::new(0.0, 0.0, 0.0), Vec3::NEG_Z, 8.0).unwrap();
        assert_eq!(
            hit.surface,
            Surface::BlockFace {
                position: Vec3::new(0.0, 0.0, -3.0),
                face_index: Face::PosZ.index(),
            }
        );
        assert!((hit.distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn hits_side_faces() {
        let world = World::with_blocks([(BlockPos::new(3, 1, 0), Material::Log)]);
        let hit = pick(&world, GROUND, Vec3::new(0.0, 1.0, 0.0), Vec3::X, 8.0).unwrap();
        assert_eq!(
            hit.surface,
            Surface::BlockFace {
                position: Vec3::new(3.0, 1.0, 0.0),
                face_index: Face::NegX.index(),
            }
        );
    }

    #[test]
    fn top_face_when_looking_down() {
        let world = World::with_blocks([(BlockPos::new(0, 0, 0), Material::Grass)]);
        let hit = pick(&world, GROUND, Vec3::new(0.1, 3.0, -0.2), Vec3::NEG_Y, 8.0).unwrap();
        assert_eq!(
            hit.surface,
            Surface::BlockFace {
                position: Vec3::ZERO,
                face_index: Face::PosY.index(),
            }
        );
    }

    #[test]
    fn falls_through_to_ground() {
        let world = World::new();
        let hit = pick(&world, GROUND, Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.0, -1.0, -1.0), 8.0)
            .unwrap();
        match hit.surface {
            Surface::Ground { point } => {
                assert!((point.y + 0.5).abs() < 1e-5);
                assert!((point.z + 2.0).abs() < 1e-5);
            }
            other => panic!("expected ground, got {other:?}"),
        }
    }

    #[test]
    fn nearer_block_beats_ground() {
        let world = World::with_blocks([(BlockPos::new(0, 0, -1), Material::Dirt)]);
        let hit = pick(&world, GROUND, Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.0, -1.0, -1.0), 8.0)
            .unwrap();
        assert!(matches!(hit.surface, Surface::BlockFace { .. }));
    }

    #[test]
    fn out_of_reach_or_off_plane_misses() {
        let world = World::with_blocks([(BlockPos::new(0, 0, -20), Material::Dirt)]);
        assert!(pick(&world, GROUND, Vec3::ZERO, Vec3::NEG_Z, 8.0).is_none());
        assert!(pick(&world, GROUND, Vec3::new(60.0, 1.0, 0.0), Vec3::NEG_Y, 8.0).is_none());
        assert!(pick(&world, GROUND, Vec3::ZERO, Vec3::ZERO, 8.0).is_none());
    }
}

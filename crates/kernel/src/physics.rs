//! Physics capability used by the player controller, plus a small built-in
//! simulation: one box-shaped dynamic body against static unit blocks and a
//! finite ground plane.

use crate::world::{World, WorldEvent};
use buildspace_common::{BlockPos, PhysicsConfig};
use glam::Vec3;
use std::collections::HashSet;

/// What the controller needs from a physics engine.
///
/// Implementations own the controlled body's position and velocity; the
/// controller only writes velocity and reads state back.
pub trait PhysicsBackend {
    fn set_velocity(&mut self, velocity: Vec3);
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    /// Advance the whole simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}

/// Overlap tolerance so that touching surfaces do not count as penetration.
const CONTACT_EPSILON: f32 = 1e-4;

/// Bodies that fall this far below the ground are put back at spawn.
const KILL_DEPTH: f32 = 64.0;

/// Gravity, ground plane and static block colliders around a single body.
#[derive(Debug, Clone)]
pub struct SimplePhysics {
    position: Vec3,
    velocity: Vec3,
    spawn: Vec3,
    half_extent: f32,
    gravity: f32,
    ground_height: f32,
    ground_half_extent: f32,
    solids: HashSet<BlockPos>,
}

impl SimplePhysics {
    pub fn new(config: &PhysicsConfig, spawn: Vec3, radius: f32) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            spawn,
            half_extent: radius,
            gravity: config.gravity,
            ground_height: config.ground_height,
            ground_half_extent: config.ground_half_extent,
            solids: HashSet::new(),
        }
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    pub fn is_solid(&self, position: BlockPos) -> bool {
        self.solids.contains(&position)
    }

    pub fn insert_solid(&mut self, position: BlockPos) {
        self.solids.insert(position);
    }

    pub fn remove_solid(&mut self, position: BlockPos) {
        self.solids.remove(&position);
    }

    /// Replace all static colliders with the world's blocks.
    pub fn sync_from(&mut self, world: &World) {
        self.solids = world.blocks().map(|b| b.position).collect();
    }

    /// Mirror grid mutations into the collider set.
    pub fn apply_events(&mut self, events: &[WorldEvent]) {
        for event in events {
            match event {
                WorldEvent::Placed { position, .. } => self.insert_solid(*position),
                WorldEvent::Removed { position, .. } => self.remove_solid(*position),
            }
        }
    }

    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    fn over_ground(&self) -> bool {
        self.position.x.abs() <= self.ground_half_extent
            && self.position.z.abs() <= self.ground_half_extent
    }

    /// Solid cells currently overlapping the body.
    fn overlapping(&self) -> Vec<BlockPos> {
        let half = Vec3::splat(self.half_extent);
        let min = self.position - half;
        let max = self.position + half;
        let lo = BlockPos::containing(min);
        let hi = BlockPos::containing(max);
        let mut hits = Vec::new();
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    let cell = BlockPos::new(x, y, z);
                    if !self.solids.contains(&cell) {
                        continue;
                    }
                    let c = cell.center();
                    let overlaps = (0..3).all(|axis| {
                        min[axis] < c[axis] + 0.5 - CONTACT_EPSILON
                            && max[axis] > c[axis] - 0.5 + CONTACT_EPSILON
                    });
                    if overlaps {
                        hits.push(cell);
                    }
                }
            }
        }
        hits
    }

    /// Move along one axis and push back out of anything entered.
    fn move_axis(&mut self, axis: usize, delta: f32) {
        if delta == 0.0 {
            return;
        }
        self.position[axis] += delta;
        for cell in self.overlapping() {
            let c = cell.center();
            self.position[axis] = if delta > 0.0 {
                c[axis] - 0.5 - self.half_extent
            } else {
                c[axis] + 0.5 + self.half_extent
            };
            self.velocity[axis] = 0.0;
        }
        if axis == 1 && self.over_ground() {
            let floor = self.ground_height + self.half_extent;
            if self.position.y < floor {
                self.position.y = floor;
                self.velocity.y = 0.0;
            }
        }
    }

    /// A block placed inside the body lifts it onto the block's top.
    fn depenetrate(&mut self) {
        for cell in self.overlapping() {
            self.position.y = self.position.y.max(cell.center().y + 0.5 + self.half_extent);
        }
    }
}

impl PhysicsBackend for SimplePhysics {
    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn step(&mut self, dt: f32) {
        self.depenetrate();
        self.velocity.y += self.gravity * dt;
        for axis in 0..3 {
            let delta = self.velocity[axis] * dt;
            self.move_axis(axis, delta);
        }
        if self.position.y < self.ground_height - KILL_DEPTH {
            tracing::info!("body fell out of the world, respawning");
            self.teleport(self.spawn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspace_common::Material;

    const DT: f32 = 1.0 / 60.0;

    fn physics_at(spawn: Vec3) -> SimplePhysics {
        SimplePhysics::new(&PhysicsConfig::default(), spawn, 0.5)
    }

    #[test]
    fn falls_and_rests_on_ground() {
        let mut phys = physics_at(Vec3::new(0.0, 5.0, 0.0));
        for _ in 0..300 {
            phys.step(DT);
        }
        assert!((phys.position().y - 0.0).abs() < 1e-4);
        assert_eq!(phys.velocity().y, 0.0);
    }

    #[test]
    fn lands_on_block_top() {
        let mut phys = physics_at(Vec3::new(0.0, 5.0, 0.0));
        phys.insert_solid(BlockPos::new(0, 0, 0));
        for _ in 0..300 {
            phys.step(DT);
        }
        // Block top is at 0.5, body half extent 0.5.
        assert!((phys.position().y - 1.0).abs() < 1e-4);
        assert!(phys.velocity().y.abs() < 0.05);
    }

    #[test]
    fn wall_stops_horizontal_motion() {
        let mut phys = physics_at(Vec3::new(0.0, 0.0, 0.0));
        phys.insert_solid(BlockPos::new(2, 0, 0));
        for _ in 0..120 {
            let v = phys.velocity();
            phys.set_velocity(Vec3::new(4.0, v.y, 0.0));
            phys.step(DT);
        }
        // Wall face at x = 1.5.
        assert!((phys.position().x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn falls_off_plane_edge_and_respawns() {
        let spawn = Vec3::new(60.0, 1.0, 0.0);
        let mut phys = physics_at(spawn);
        let mut respawned = false;
        for _ in 0..600 {
            phys.step(DT);
            if phys.position() == spawn && phys.velocity() == Vec3::ZERO {
                respawned = true;
                break;
            }
        }
        assert!(respawned);
    }

    #[test]
    fn block_placed_inside_body_lifts_it() {
        let mut phys = physics_at(Vec3::new(0.0, 0.0, 0.0));
        phys.insert_solid(BlockPos::new(0, 0, 0));
        phys.step(DT);
        assert!(phys.position().y >= 1.0 - 1e-3);
    }

    #[test]
    fn colliders_follow_world_events() {
        let mut world = World::new();
        let mut phys = physics_at(Vec3::ZERO);
        world.place(BlockPos::new(1, 0, 0), Material::Dirt);
        world.place(BlockPos::new(2, 0, 0), Material::Dirt);
        world.remove(BlockPos::new(1, 0, 0));
        phys.apply_events(&world.drain_events());
        assert_eq!(phys.solid_count(), 1);
        assert!(phys.is_solid(BlockPos::new(2, 0, 0)));

        let mut rebuilt = physics_at(Vec3::ZERO);
        rebuilt.sync_from(&world);
        assert_eq!(rebuilt.solid_count(), 1);
    }
}

use buildspace_common::{BlockKey, BlockPos, Material};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A unit cube on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub key: BlockKey,
    pub position: BlockPos,
    pub material: Material,
}

/// An event record produced by every effective mutation to the grid.
///
/// No-op calls (placing on an occupied cell, removing from an empty one)
/// produce nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    Placed {
        key: BlockKey,
        position: BlockPos,
        material: Material,
    },
    /// Carries the removed block's data for undo support.
    Removed {
        key: BlockKey,
        position: BlockPos,
        material: Material,
    },
}

/// The authoritative block grid.
///
/// At most one block occupies a position. Blocks are kept in insertion order,
/// so a block never changes its place in `blocks()` until it is removed.
///
/// Serializes as its block list. Deserializing rebuilds the position index
/// and drops later blocks that share a position with an earlier one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Block>", into = "Vec<Block>")]
pub struct World {
    /// Insertion sequence -> block.
    blocks: BTreeMap<u64, Block>,
    /// Position -> insertion sequence.
    index: HashMap<BlockPos, u64>,
    next_seq: u64,
    /// Append-only event log of all mutations.
    event_log: Vec<WorldEvent>,
}

impl From<Vec<Block>> for World {
    fn from(blocks: Vec<Block>) -> Self {
        let mut world = Self::new();
        for block in blocks {
            world.place_with_key(block.key, block.position, block.material);
        }
        world.event_log.clear();
        world
    }
}

impl From<World> for Vec<Block> {
    fn from(world: World) -> Self {
        world.snapshot()
    }
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world seeded with the given blocks. Later duplicates of a
    /// position are ignored. Seeding is not recorded in the event log.
    pub fn with_blocks(seed: impl IntoIterator<Item = (BlockPos, Material)>) -> Self {
        let mut world = Self::new();
        for (position, material) in seed {
            world.place(position, material);
        }
        world.event_log.clear();
        world
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, position: BlockPos) -> bool {
        self.index.contains_key(&position)
    }

    pub fn get(&self, position: BlockPos) -> Option<&Block> {
        self.index
            .get(&position)
            .and_then(|seq| self.blocks.get(seq))
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.values()
    }

    /// Copy of the current block list, in insertion order.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.values().copied().collect()
    }

    /// Place a block if `position` is free. Returns the new key, or `None`
    /// when the cell was already occupied (the existing block is kept).
    pub fn place(&mut self, position: BlockPos, material: Material) -> Option<BlockKey> {
        let key = BlockKey::new();
        self.place_with_key(key, position, material).then_some(key)
    }

    /// Place with a specific key (used for replay/undo). Returns false if occupied.
    pub fn place_with_key(&mut self, key: BlockKey, position: BlockPos, material: Material) -> bool {
        if self.index.contains_key(&position) {
            tracing::trace!(%position, "place ignored: cell occupied");
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.blocks.insert(
            seq,
            Block {
                key,
                position,
                material,
            },
        );
        self.index.insert(position, seq);
        self.event_log.push(WorldEvent::Placed {
            key,
            position,
            material,
        });
        tracing::debug!(%position, %material, "block placed");
        true
    }

    /// Remove the block at `position`. Returns it if there was one.
    pub fn remove(&mut self, position: BlockPos) -> Option<Block> {
        let seq = self.index.remove(&position)?;
        let block = self.blocks.remove(&seq)?;
        self.event_log.push(WorldEvent::Removed {
            key: block.key,
            position,
            material: block.material,
        });
        tracing::debug!(%position, material = %block.material, "block removed");
        Some(block)
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Reconstruct a world from a sequence of events.
    pub fn replay(events: &[WorldEvent]) -> Self {
        let mut world = Self::new();
        for event in events {
            match event {
                WorldEvent::Placed {
                    key,
                    position,
                    material,
                } => {
                    world.place_with_key(*key, *position, *material);
                }
                WorldEvent::Removed { position, .. } => {
                    world.remove(*position);
                }
            }
        }
        world.event_log.clear();
        world
    }

    /// Deterministic FNV-1a digest of the block list, sensitive to order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for block in self.blocks.values() {
            mix(&mut h, block.key.0.as_bytes());
            mix(&mut h, &block.position.x.to_le_bytes());
            mix(&mut h, &block.position.y.to_le_bytes());
            mix(&mut h, &block.position.z.to_le_bytes());
            mix(&mut h, block.material.name().as_bytes());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.block_count(), 0);
        assert!(w.snapshot().is_empty());
    }

    #[test]
    fn place_is_idempotent_and_keeps_first_material() {
        let mut w = World::new();
        assert!(w.place(p(1, 0, 1), Material::Grass).is_some());
        assert!(w.place(p(1, 0, 1), Material::Log).is_none());
        assert_eq!(w.block_count(), 1);
        assert_eq!(w.get(p(1, 0, 1)).unwrap().material, Material::Grass);
        // Only the effective placement is logged.
        assert_eq!(w.events().len(), 1);
    }

    #[test]
    fn remove_then_place_succeeds() {
        let mut w = World::new();
        w.place(p(0, 0, 0), Material::Dirt);
        assert!(w.remove(p(0, 0, 0)).is_some());
        assert!(w.place(p(0, 0, 0), Material::Wood).is_some());
        assert_eq!(w.get(p(0, 0, 0)).unwrap().material, Material::Wood);

        // Also on a cell that was never occupied.
        assert!(w.remove(p(9, 9, 9)).is_none());
        assert!(w.place(p(9, 9, 9), Material::Glass).is_some());
        assert_eq!(w.get(p(9, 9, 9)).unwrap().material, Material::Glass);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut w = World::new();
        w.place(p(1, 1, 1), Material::Log);
        assert!(w.remove(p(2, 2, 2)).is_none());
        assert_eq!(w.block_count(), 1);
        assert_eq!(w.events().len(), 1);
    }

    #[test]
    fn snapshot_order_is_stable() {
        let mut w = World::new();
        for i in 0..5 {
            w.place(p(i, 0, 0), Material::Cobblestone);
        }
        w.remove(p(2, 0, 0));
        w.place(p(-1, 0, 0), Material::Grass);

        let xs: Vec<i32> = w.blocks().map(|b| b.position.x).collect();
        assert_eq!(xs, vec![0, 1, 3, 4, -1]);
    }

    #[test]
    fn keys_are_unique_per_block() {
        let mut w = World::new();
        let a = w.place(p(0, 0, 0), Material::Dirt).unwrap();
        let b = w.place(p(0, 1, 0), Material::Dirt).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn with_blocks_skips_duplicates_and_logs_nothing() {
        let w = World::with_blocks([
            (p(1, 0, 1), Material::Grass),
            (p(1, 0, 1), Material::Dirt),
            (p(2, 0, 1), Material::Dirt),
        ]);
        assert_eq!(w.block_count(), 2);
        assert_eq!(w.get(p(1, 0, 1)).unwrap().material, Material::Grass);
        assert!(w.events().is_empty());
    }

    #[test]
    fn drain_events_clears_log() {
        let mut w = World::new();
        w.place(p(0, 0, 0), Material::Dirt);
        let events = w.drain_events();
        assert_eq!(events.len(), 1);
        assert!(w.events().is_empty());
    }

    #[test]
    fn replay_equivalence() {
        let mut w = World::new();
        for i in 0..20 {
            w.place(p(i, i % 3, -i), Material::ALL[i as usize % 6]);
        }
        for i in (0..20).step_by(4) {
            w.remove(p(i, i % 3, -i));
        }
        w.place(p(100, 0, 0), Material::Glass);

        let replayed = World::replay(w.events());
        assert_eq!(replayed.block_count(), w.block_count());
        assert_eq!(replayed.state_hash(), w.state_hash());
        assert_eq!(replayed.snapshot(), w.snapshot());
    }

    #[test]
    fn deserialized_world_keeps_one_block_per_cell() {
        let mut w = World::new();
        w.place(p(3, 4, 5), Material::Log);
        w.place(p(0, 0, 0), Material::Dirt);
        let json = serde_json::to_string(&w).unwrap();
        let mut back: World = serde_json::from_str(&json).unwrap();
        assert_eq!(back.snapshot(), w.snapshot());
        assert!(back.events().is_empty());
        assert!(back.place(p(3, 4, 5), Material::Dirt).is_none());
        assert_eq!(back.block_count(), 2);
        assert_eq!(back.get(p(3, 4, 5)).unwrap().material, Material::Log);
    }

    #[test]
    fn deserializing_duplicate_positions_keeps_the_first() {
        let first = Block {
            key: BlockKey::new(),
            position: p(1, 1, 1),
            material: Material::Wood,
        };
        let second = Block {
            key: BlockKey::new(),
            material: Material::Glass,
            ..first
        };
        let json = serde_json::to_string(&vec![first, second]).unwrap();
        let back: World = serde_json::from_str(&json).unwrap();
        assert_eq!(back.block_count(), 1);
        assert_eq!(back.get(p(1, 1, 1)), Some(&first));
    }
}

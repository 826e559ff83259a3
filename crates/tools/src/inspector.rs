use buildspace_common::{BlockPos, Material};
use buildspace_kernel::{Block, World};

/// Read-only queries against the block grid for debug UI and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    pub fn summary(world: &World) -> WorldSummary {
        let mut per_material = [0usize; Material::ALL.len()];
        let mut bounds: Option<(BlockPos, BlockPos)> = None;
        for block in world.blocks() {
            if let Some(i) = Material::ALL.iter().position(|m| *m == block.material) {
                per_material[i] += 1;
            }
            let p = block.position;
            bounds = Some(match bounds {
                None => (p, p),
                Some((lo, hi)) => (
                    BlockPos::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                    BlockPos::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
                ),
            });
        }
        WorldSummary {
            block_count: world.block_count(),
            per_material: Material::ALL
                .iter()
                .copied()
                .zip(per_material)
                .filter(|(_, n)| *n > 0)
                .collect(),
            bounds,
            pending_events: world.events().len(),
            state_hash: world.state_hash(),
        }
    }

    pub fn inspect(world: &World, position: BlockPos) -> Option<BlockInfo> {
        world.get(position).map(BlockInfo::from)
    }

    /// Positions of every block using `material`, in insertion order.
    pub fn find(world: &World, material: Material) -> Vec<BlockPos> {
        world
            .blocks()
            .filter(|b| b.material == material)
            .map(|b| b.position)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSummary {
    pub block_count: usize,
    /// Materials in palette order, omitting unused ones.
    pub per_material: Vec<(Material, usize)>,
    /// Inclusive min/max corner of occupied cells.
    pub bounds: Option<(BlockPos, BlockPos)>,
    pub pending_events: usize,
    pub state_hash: u64,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "World: blocks={}", self.block_count)?;
        for (material, n) in &self.per_material {
            write!(f, " {material}={n}")?;
        }
        if let Some((lo, hi)) = self.bounds {
            write!(f, " bounds={lo}..{hi}")?;
        }
        write!(f, " hash={:016x}", self.state_hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub key: String,
    pub position: BlockPos,
    pub material: Material,
}

impl From<&Block> for BlockInfo {
    fn from(block: &Block) -> Self {
        Self {
            key: block.key.short(),
            position: block.position,
            material: block.material,
        }
    }
}

impl std::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block [{}] {} {}", self.key, self.position, self.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> World {
        World::with_blocks([
            (BlockPos::new(1, 0, 1), Material::Grass),
            (BlockPos::new(-2, 3, 1), Material::Log),
            (BlockPos::new(1, 1, 4), Material::Log),
        ])
    }

    #[test]
    fn summary_empty_world() {
        let summary = WorldInspector::summary(&World::new());
        assert_eq!(summary.block_count, 0);
        assert!(summary.per_material.is_empty());
        assert_eq!(summary.bounds, None);
    }

    #[test]
    fn summary_counts_and_bounds() {
        let summary = WorldInspector::summary(&sample());
        assert_eq!(summary.block_count, 3);
        assert_eq!(
            summary.per_material,
            vec![(Material::Grass, 1), (Material::Log, 2)]
        );
        assert_eq!(
            summary.bounds,
            Some((BlockPos::new(-2, 0, 1), BlockPos::new(1, 3, 4)))
        );
    }

    #[test]
    fn summary_tracks_unsynced_events() {
        let mut world = sample();
        world.place(BlockPos::new(0, 5, 0), Material::Glass);
        world.remove(BlockPos::new(1, 0, 1));
        assert_eq!(WorldInspector::summary(&world).pending_events, 2);
    }

    #[test]
    fn inspect_block() {
        let world = sample();
        let info = WorldInspector::inspect(&world, BlockPos::new(-2, 3, 1)).unwrap();
        assert_eq!(info.material, Material::Log);
        assert!(format!("{info}").contains("(-2, 3, 1) log"));
        assert!(WorldInspector::inspect(&world, BlockPos::new(9, 9, 9)).is_none());
    }

    #[test]
    fn find_by_material() {
        let found = WorldInspector::find(&sample(), Material::Log);
        assert_eq!(found, vec![BlockPos::new(-2, 3, 1), BlockPos::new(1, 1, 4)]);
    }

    #[test]
    fn summary_display() {
        let s = format!("{}", WorldInspector::summary(&sample()));
        assert!(s.contains("blocks=3"));
        assert!(s.contains("log=2"));
    }
}

use buildspace_common::{BlockPos, CameraPose};
use buildspace_kernel::{Block, World};
use std::fmt::Write;

/// Everything a renderer needs for one frame: the block list in insertion
/// order, the camera, and the block under the crosshair.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub blocks: Vec<Block>,
    pub camera: CameraPose,
    pub highlighted: Option<BlockPos>,
}

impl SceneFrame {
    pub fn capture(world: &World, camera: CameraPose, highlighted: Option<BlockPos>) -> Self {
        Self {
            blocks: world.snapshot(),
            camera,
            highlighted,
        }
    }

    pub fn opaque(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().filter(|b| !b.material.is_translucent())
    }

    pub fn translucent(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().filter(|b| b.material.is_translucent())
    }
}

/// Renderer-agnostic interface. Renderers read a frame and never touch the
/// world; the grid is owned by the session.
pub trait Renderer {
    type Output;

    fn render(&self, frame: &SceneFrame) -> Self::Output;
}

/// Human-readable dump of a frame, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &SceneFrame) -> String {
        let mut out = String::new();
        let cam = &frame.camera;
        let _ = writeln!(out, "=== Scene ({} blocks) ===", frame.blocks.len());
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.yaw.to_degrees(),
            cam.pitch.to_degrees()
        );
        match frame.highlighted {
            Some(p) => {
                let _ = writeln!(out, "Target: {p}");
            }
            None => out.push_str("Target: none\n"),
        }
        for block in &frame.blocks {
            let _ = writeln!(
                out,
                "  [{}] {} {}",
                block.key.short(),
                block.position,
                block.material
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspace_common::Material;

    #[test]
    fn empty_scene() {
        let frame = SceneFrame::capture(&World::new(), CameraPose::default(), None);
        let out = DebugTextRenderer::new().render(&frame);
        assert!(out.contains("0 blocks"));
        assert!(out.contains("Target: none"));
    }

    #[test]
    fn lists_blocks_in_insertion_order() {
        let world = World::with_blocks([
            (BlockPos::new(2, 0, 0), Material::Log),
            (BlockPos::new(1, 0, 0), Material::Glass),
        ]);
        let frame = SceneFrame::capture(&world, CameraPose::default(), Some(BlockPos::new(2, 0, 0)));
        let out = DebugTextRenderer::new().render(&frame);
        let log = out.find("(2, 0, 0) log").unwrap();
        let glass = out.find("(1, 0, 0) glass").unwrap();
        assert!(log < glass);
        assert!(out.contains("Target: (2, 0, 0)"));
    }

    #[test]
    fn splits_translucent_blocks() {
        let world = World::with_blocks([
            (BlockPos::new(0, 0, 0), Material::Glass),
            (BlockPos::new(1, 0, 0), Material::Dirt),
        ]);
        let frame = SceneFrame::capture(&world, CameraPose::default(), None);
        assert_eq!(frame.opaque().count(), 1);
        assert_eq!(frame.translucent().count(), 1);
    }
}

use buildspace_common::{BlockKey, BlockPos, Material};
use buildspace_kernel::placement::{self, Interaction, Placement};
use buildspace_kernel::{Block, World};

/// A grid edit that can be applied to the world and reversed.
///
/// Each command carries the block's key so undo/redo restore the same block,
/// keeping render identity stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    /// Undo = remove it.
    Place {
        key: BlockKey,
        position: BlockPos,
        material: Material,
    },
    /// Undo = put it back.
    Remove {
        key: BlockKey,
        position: BlockPos,
        material: Material,
    },
}

impl EditCommand {
    pub fn inverse(&self) -> Self {
        match *self {
            Self::Place {
                key,
                position,
                material,
            } => Self::Remove {
                key,
                position,
                material,
            },
            Self::Remove {
                key,
                position,
                material,
            } => Self::Place {
                key,
                position,
                material,
            },
        }
    }

    pub fn position(&self) -> BlockPos {
        match self {
            Self::Place { position, .. } | Self::Remove { position, .. } => *position,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    #[error("cell {0} is already occupied")]
    Occupied(BlockPos),
    #[error("no block at {0}")]
    Empty(BlockPos),
    #[error("interaction does not resolve to an edit")]
    Unresolved,
}

/// Undo/redo over the world grid.
///
/// Only effective edits are recorded: a rejected place or remove leaves both
/// stacks untouched.
#[derive(Debug, Default)]
pub struct Editor {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(
        &mut self,
        world: &mut World,
        position: BlockPos,
        material: Material,
    ) -> Result<BlockKey, EditError> {
        let key = world
            .place(position, material)
            .ok_or(EditError::Occupied(position))?;
        self.record(EditCommand::Place {
            key,
            position,
            material,
        });
        Ok(key)
    }

    pub fn remove(&mut self, world: &mut World, position: BlockPos) -> Result<Block, EditError> {
        let block = world.remove(position).ok_or(EditError::Empty(position))?;
        self.record(EditCommand::Remove {
            key: block.key,
            position,
            material: block.material,
        });
        Ok(block)
    }

    /// Resolve a pointer interaction and apply it as an undoable edit.
    pub fn interact(
        &mut self,
        world: &mut World,
        interaction: &Interaction,
        material: Material,
    ) -> Result<Placement, EditError> {
        let placement = placement::resolve(interaction).ok_or(EditError::Unresolved)?;
        match placement {
            Placement::Place(p) => self.place(world, p, material).map(|_| placement),
            Placement::Remove(p) => self.remove(world, p).map(|_| placement),
        }
    }

    fn record(&mut self, cmd: EditCommand) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
    }

    /// Undo the last edit. Returns true if an operation was undone.
    pub fn undo(&mut self, world: &mut World) -> bool {
        let Some(cmd) = self.undo_stack.pop() else {
            return false;
        };
        apply_command(world, &cmd.inverse());
        tracing::debug!(position = %cmd.position(), "edit undone");
        self.redo_stack.push(cmd);
        true
    }

    /// Redo the last undone edit. Returns true if an operation was redone.
    pub fn redo(&mut self, world: &mut World) -> bool {
        let Some(cmd) = self.redo_stack.pop() else {
            return false;
        };
        apply_command(world, &cmd);
        tracing::debug!(position = %cmd.position(), "edit redone");
        self.undo_stack.push(cmd);
        true
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

fn apply_command(world: &mut World, cmd: &EditCommand) {
    match *cmd {
        EditCommand::Place {
            key,
            position,
            material,
        } => {
            world.place_with_key(key, position, material);
        }
        EditCommand::Remove { position, .. } => {
            world.remove(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspace_kernel::{InteractionKind, Surface};
    use glam::Vec3;

    fn p(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    #[test]
    fn place_and_undo() {
        let mut world = World::new();
        let mut editor = Editor::new();
        editor.place(&mut world, p(0, 0, 0), Material::Dirt).unwrap();
        assert_eq!(world.block_count(), 1);

        assert!(editor.undo(&mut world));
        assert!(world.is_empty());
    }

    #[test]
    fn redo_restores_same_key() {
        let mut world = World::new();
        let mut editor = Editor::new();
        let key = editor.place(&mut world, p(1, 0, 0), Material::Log).unwrap();
        editor.undo(&mut world);
        editor.redo(&mut world);
        assert_eq!(world.get(p(1, 0, 0)).unwrap().key, key);
    }

    #[test]
    fn remove_and_undo() {
        let mut world = World::new();
        let mut editor = Editor::new();
        editor.place(&mut world, p(0, 1, 0), Material::Glass).unwrap();
        let removed = editor.remove(&mut world, p(0, 1, 0)).unwrap();
        assert!(world.is_empty());

        editor.undo(&mut world);
        let back = world.get(p(0, 1, 0)).unwrap();
        assert_eq!(back.material, Material::Glass);
        assert_eq!(back.key, removed.key);
    }

    #[test]
    fn noop_edits_record_nothing() {
        let mut world = World::new();
        let mut editor = Editor::new();
        editor.place(&mut world, p(0, 0, 0), Material::Dirt).unwrap();
        assert_eq!(
            editor.place(&mut world, p(0, 0, 0), Material::Wood),
            Err(EditError::Occupied(p(0, 0, 0)))
        );
        assert_eq!(
            editor.remove(&mut world, p(5, 5, 5)).map(|b| b.position),
            Err(EditError::Empty(p(5, 5, 5)))
        );
        assert_eq!(editor.undo_count(), 1);
    }

    #[test]
    fn redo_cleared_on_new_edit() {
        let mut world = World::new();
        let mut editor = Editor::new();
        editor.place(&mut world, p(0, 0, 0), Material::Dirt).unwrap();
        editor.undo(&mut world);
        assert!(editor.can_redo());

        editor.place(&mut world, p(1, 0, 0), Material::Dirt).unwrap();
        assert!(!editor.can_redo());
    }

    #[test]
    fn empty_stacks_return_false() {
        let mut world = World::new();
        let mut editor = Editor::new();
        assert!(!editor.undo(&mut world));
        assert!(!editor.redo(&mut world));
    }

    #[test]
    fn interactions_are_undoable() {
        let mut world = World::new();
        let mut editor = Editor::new();
        let click = Interaction {
            surface: Surface::Ground {
                point: Vec3::new(1.2, 0.0, 2.9),
            },
            kind: InteractionKind::Secondary,
        };
        assert_eq!(
            editor.interact(&mut world, &click, Material::Wood),
            Ok(Placement::Place(p(2, 0, 3)))
        );
        let miss = Interaction {
            kind: InteractionKind::Primary,
            ..click
        };
        assert_eq!(
            editor.interact(&mut world, &miss, Material::Wood),
            Err(EditError::Unresolved)
        );
        editor.undo(&mut world);
        assert!(world.is_empty());
    }
}

use crate::event::GameEvent;
use buildspace_author::Editor;
use buildspace_common::{BlockPos, CameraPose, GameConfig, Material};
use buildspace_input::{Action, InputState, KeyBindings, KeyEdge, MaterialSelection};
use buildspace_kernel::raycast::{self, GroundPlane, Hit};
use buildspace_kernel::{
    Interaction, MoveIntent, PhysicsBackend, PlayerController, SimplePhysics, Surface, World,
    WorldEvent,
};
use buildspace_render::SceneFrame;
use glam::Vec3;
use std::collections::VecDeque;

/// Longest frame the simulation will catch up on.
const MAX_FRAME_DT: f32 = 0.1;

/// A small starter structure near spawn.
pub const DEMO_BLOCKS: [((i32, i32, i32), Material); 5] = [
    ((1, 0, 1), Material::Grass),
    ((2, 0, 1), Material::Dirt),
    ((3, 0, 1), Material::Cobblestone),
    ((1, 1, 1), Material::Wood),
    ((1, 2, 1), Material::Log),
];

pub fn demo_world() -> World {
    World::with_blocks(
        DEMO_BLOCKS
            .iter()
            .map(|&((x, y, z), m)| (BlockPos::new(x, y, z), m)),
    )
}

/// Owned state of one play session.
///
/// All mutation goes through queued [`GameEvent`]s and [`Session::update`];
/// readers get snapshots via [`Session::frame`].
pub struct Session {
    config: GameConfig,
    world: World,
    editor: Editor,
    input: InputState,
    bindings: KeyBindings,
    selection: MaterialSelection,
    camera: CameraPose,
    physics: SimplePhysics,
    controller: PlayerController,
    queue: VecDeque<GameEvent>,
    accumulator: f32,
    ticks: u64,
    history: Vec<WorldEvent>,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self::with_world(config, World::new())
    }

    pub fn with_world(config: GameConfig, world: World) -> Self {
        let spawn = config.player.spawn;
        let mut physics = SimplePhysics::new(&config.physics, spawn, config.player.radius);
        physics.sync_from(&world);
        let controller = PlayerController::new(&config.player);
        let camera = CameraPose {
            position: spawn + Vec3::Y * controller.eye_offset(),
            ..CameraPose::default()
        };
        tracing::info!(blocks = world.block_count(), "session started");
        Self {
            config,
            world,
            editor: Editor::new(),
            input: InputState::new(),
            bindings: KeyBindings::default(),
            selection: MaterialSelection::default(),
            camera,
            physics,
            controller,
            queue: VecDeque::new(),
            accumulator: 0.0,
            ticks: 0,
            history: Vec::new(),
        }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    /// Dispatch queued events, then advance the player at the fixed tick rate.
    pub fn update(&mut self, dt: f32) {
        while let Some(event) = self.queue.pop_front() {
            self.dispatch(event);
        }

        if !dt.is_finite() {
            tracing::warn!(dt, "skipping simulation for non-finite frame time");
            return;
        }
        let step = self.config.physics.fixed_dt();
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        while self.accumulator >= step {
            self.accumulator -= step;
            let intent = move_intent(&self.input);
            self.controller
                .tick(&intent, &mut self.camera, &mut self.physics, step);
            self.ticks += 1;
        }
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::Key { code, pressed } => {
                if let Some(KeyEdge::Pressed(action)) =
                    self.input.handle_key(&self.bindings, &code, pressed)
                {
                    if let Some(slot) = action.hotbar_slot() {
                        self.selection.select_slot(slot);
                    }
                }
            }
            GameEvent::Look { dx, dy } => {
                self.camera
                    .look(dx, dy, self.config.player.look_sensitivity);
            }
            GameEvent::Click(kind) => match self.pick() {
                Some(hit) => self.interact(Interaction {
                    surface: hit.surface,
                    kind,
                }),
                None => tracing::trace!("click hit nothing"),
            },
            GameEvent::Interact(interaction) => self.interact(interaction),
            GameEvent::SelectMaterial(material) => {
                self.selection.select(material);
            }
            GameEvent::Undo => {
                self.editor.undo(&mut self.world);
            }
            GameEvent::Redo => {
                self.editor.redo(&mut self.world);
            }
            GameEvent::FocusLost => self.input.clear(),
        }
        self.sync_physics();
    }

    fn interact(&mut self, interaction: Interaction) {
        let material = self.selection.current();
        if let Err(e) = self.editor.interact(&mut self.world, &interaction, material) {
            tracing::debug!("interaction had no effect: {e}");
        }
    }

    fn sync_physics(&mut self) {
        let events = self.world.drain_events();
        if events.is_empty() {
            return;
        }
        self.physics.apply_events(&events);
        self.history.extend(events);
    }

    /// The surface under the crosshair, within reach.
    pub fn pick(&self) -> Option<Hit> {
        let ground = GroundPlane {
            height: self.config.physics.ground_height,
            half_extent: self.config.physics.ground_half_extent,
        };
        raycast::pick(
            &self.world,
            ground,
            self.camera.position,
            self.camera.forward(),
            self.config.player.reach,
        )
    }

    /// The block under the crosshair, if the crosshair is on a block.
    pub fn highlighted(&self) -> Option<BlockPos> {
        match self.pick()?.surface {
            Surface::BlockFace { position, .. } => Some(BlockPos::round(position)),
            Surface::Ground { .. } => None,
        }
    }

    pub fn frame(&self) -> SceneFrame {
        SceneFrame::capture(&self.world, self.camera, self.highlighted())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn selected_material(&self) -> Material {
        self.selection.current()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_position(&self) -> Vec3 {
        self.physics.position()
    }

    pub fn player_velocity(&self) -> Vec3 {
        self.physics.velocity()
    }

    /// Fixed ticks simulated so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Every effective grid mutation since the session started.
    pub fn history(&self) -> &[WorldEvent] {
        &self.history
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}

pub fn move_intent(input: &InputState) -> MoveIntent {
    MoveIntent {
        forward: input.is_active(Action::MoveForward),
        backward: input.is_active(Action::MoveBackward),
        left: input.is_active(Action::MoveLeft),
        right: input.is_active(Action::MoveRight),
        jump: input.is_active(Action::Jump),
    }
}

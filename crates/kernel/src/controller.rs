use crate::physics::PhysicsBackend;
use buildspace_common::{CameraPose, PlayerConfig};
use glam::Vec3;

/// Movement flags the controller reads each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// First-person walking controller over an injected physics body.
///
/// The controller has no state machine of its own: each tick it turns the
/// current flags and camera yaw into a velocity, lets physics integrate it,
/// and moves the camera to the body.
#[derive(Debug, Clone)]
pub struct PlayerController {
    speed: f32,
    jump_force: f32,
    grounded_threshold: f32,
    eye_offset: f32,
}

impl PlayerController {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            speed: config.speed,
            jump_force: config.jump_force,
            grounded_threshold: config.grounded_threshold,
            eye_offset: config.eye_offset,
        }
    }

    pub fn eye_offset(&self) -> f32 {
        self.eye_offset
    }

    /// Whether a body with this velocity counts as standing on something.
    pub fn is_grounded(&self, velocity: Vec3) -> bool {
        velocity.y.abs() < self.grounded_threshold
    }

    /// World-space horizontal velocity for the given flags, rotated by `yaw`.
    pub fn horizontal_velocity(&self, intent: &MoveIntent, yaw: f32) -> Vec3 {
        let lateral = intent.right as i32 - intent.left as i32;
        let longitudinal = intent.backward as i32 - intent.forward as i32;
        let local = Vec3::new(lateral as f32, 0.0, longitudinal as f32);
        if local == Vec3::ZERO {
            return Vec3::ZERO;
        }
        glam::Quat::from_rotation_y(yaw) * (local.normalize() * self.speed)
    }

    /// Full target velocity: horizontal from input, vertical preserved unless a
    /// jump triggers from the ground.
    pub fn target_velocity(&self, intent: &MoveIntent, yaw: f32, current: Vec3) -> Vec3 {
        let horizontal = self.horizontal_velocity(intent, yaw);
        let vertical = if intent.jump && self.is_grounded(current) {
            self.jump_force
        } else {
            current.y
        };
        Vec3::new(horizontal.x, vertical, horizontal.z)
    }

    /// Run one simulation tick and move the camera to the body's eye.
    pub fn tick<P: PhysicsBackend + ?Sized>(
        &self,
        intent: &MoveIntent,
        camera: &mut CameraPose,
        physics: &mut P,
        dt: f32,
    ) {
        let velocity = self.target_velocity(intent, camera.yaw, physics.velocity());
        physics.set_velocity(velocity);
        physics.step(dt);
        camera.position = physics.position() + Vec3::Y * self.eye_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    /// Integrates velocity without gravity or collisions and records writes.
    #[derive(Default)]
    struct RecordingPhysics {
        position: Vec3,
        velocity: Vec3,
        writes: Vec<Vec3>,
        steps: usize,
    }

    impl PhysicsBackend for RecordingPhysics {
        fn set_velocity(&mut self, velocity: Vec3) {
            self.velocity = velocity;
            self.writes.push(velocity);
        }
        fn position(&self) -> Vec3 {
            self.position
        }
        fn velocity(&self) -> Vec3 {
            self.velocity
        }
        fn step(&mut self, dt: f32) {
            self.position += self.velocity * dt;
            self.steps += 1;
        }
    }

    fn controller() -> PlayerController {
        PlayerController::new(&PlayerConfig::default())
    }

    fn forward() -> MoveIntent {
        MoveIntent {
            forward: true,
            ..MoveIntent::default()
        }
    }

    #[test]
    fn idle_has_no_horizontal_velocity() {
        let v = controller().horizontal_velocity(&MoveIntent::default(), 1.0);
        assert_eq!(v, Vec3::ZERO);
        // Opposite keys cancel out.
        let both = MoveIntent {
            left: true,
            right: true,
            ..MoveIntent::default()
        };
        assert_eq!(controller().horizontal_velocity(&both, 0.0), Vec3::ZERO);
    }

    #[test]
    fn forward_at_default_yaw_is_negative_z() {
        let v = controller().horizontal_velocity(&forward(), 0.0);
        assert!((v - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn forward_follows_rotated_yaw() {
        let v = controller().horizontal_velocity(&forward(), FRAC_PI_2);
        // Rotated forward axis, not world -Z.
        assert!((v - Vec3::new(-4.0, 0.0, 0.0)).length() < 1e-5);
        assert!(v.z.abs() < 1e-5);
    }

    #[test]
    fn diagonal_is_normalized() {
        let intent = MoveIntent {
            forward: true,
            right: true,
            ..MoveIntent::default()
        };
        let v = controller().horizontal_velocity(&intent, 0.3);
        assert!((v.length() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn strafe_right_at_default_yaw_is_positive_x() {
        let intent = MoveIntent {
            right: true,
            ..MoveIntent::default()
        };
        let v = controller().horizontal_velocity(&intent, 0.0);
        assert!((v - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn jump_gated_by_vertical_velocity() {
        let c = controller();
        let intent = MoveIntent {
            jump: true,
            ..MoveIntent::default()
        };
        let airborne = c.target_velocity(&intent, 0.0, Vec3::new(0.0, 0.2, 0.0));
        assert_eq!(airborne.y, 0.2);
        let falling = c.target_velocity(&intent, 0.0, Vec3::new(0.0, -0.2, 0.0));
        assert_eq!(falling.y, -0.2);
        let grounded = c.target_velocity(&intent, 0.0, Vec3::new(0.0, 0.01, 0.0));
        assert_eq!(grounded.y, 4.0);
    }

    #[test]
    fn vertical_velocity_preserved_without_jump() {
        let v = controller().target_velocity(&forward(), 0.0, Vec3::new(9.0, -3.0, 9.0));
        assert_eq!(v.y, -3.0);
        // Horizontal is replaced, not accumulated.
        assert!((v.x).abs() < 1e-5);
    }

    #[test]
    fn tick_writes_velocity_steps_and_syncs_camera() {
        let c = controller();
        let mut physics = RecordingPhysics {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..RecordingPhysics::default()
        };
        let mut camera = CameraPose::default();
        c.tick(&forward(), &mut camera, &mut physics, 0.5);

        assert_eq!(physics.writes.len(), 1);
        assert_eq!(physics.steps, 1);
        assert!((physics.position - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
        assert!((camera.position - Vec3::new(1.0, 2.75, 1.0)).length() < 1e-5);
    }

    #[test]
    fn tick_rereads_yaw_every_call() {
        let c = controller();
        let mut physics = RecordingPhysics::default();
        let mut camera = CameraPose::default();
        c.tick(&forward(), &mut camera, &mut physics, 1.0);
        camera.yaw = FRAC_PI_2;
        c.tick(&forward(), &mut camera, &mut physics, 1.0);
        assert!((physics.writes[0] - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!((physics.writes[1] - Vec3::new(-4.0, 0.0, 0.0)).length() < 1e-5);
    }
}

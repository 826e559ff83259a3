use buildspace_common::CameraPose;
use glam::{Mat4, Vec3};

/// Perspective projection for a first-person [`CameraPose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstPersonCamera {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.05,
            far: 500.0,
        }
    }
}

impl FirstPersonCamera {
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self, pose: &CameraPose) -> Mat4 {
        let forward = pose.forward();
        let up = pose.rotation() * Vec3::Y;
        Mat4::look_to_rh(pose.position, forward, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self, pose: &CameraPose) -> Mat4 {
        self.projection_matrix() * self.view_matrix(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn point_ahead_projects_to_center() {
        let cam = FirstPersonCamera::default();
        let pose = CameraPose {
            position: Vec3::new(0.0, 1.0, 0.0),
            ..CameraPose::default()
        };
        let clip = cam.view_projection(&pose) * Vec3::new(0.0, 1.0, -5.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn view_follows_yaw() {
        let cam = FirstPersonCamera::default();
        let pose = CameraPose {
            yaw: FRAC_PI_2,
            ..CameraPose::default()
        };
        // Yaw +90 degrees looks down -X.
        let eye = cam.view_matrix(&pose).transform_point3(Vec3::new(-3.0, 0.0, 0.0));
        assert!((eye - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-4);
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = FirstPersonCamera::default();
        cam.set_viewport(800, 0);
        assert_eq!(cam.aspect, 800.0);
        cam.set_viewport(1280, 720);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}

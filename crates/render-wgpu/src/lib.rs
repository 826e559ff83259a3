//! wgpu render backend: sky, ground plane and instanced material-coloured
//! cubes seen through a first-person camera.
//!
//! # Invariants
//! - The renderer only reads [`buildspace_render::SceneFrame`]s.
//! - Translucent blocks are drawn after all opaque geometry.

mod camera;
mod gpu;
mod shaders;

pub use camera::FirstPersonCamera;
pub use gpu::WgpuRenderer;

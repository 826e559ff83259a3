//! Shared types for the buildspace sandbox: grid coordinates, faces, materials,
//! camera pose and game configuration.

mod config;
mod material;
mod types;

pub use config::{AdviceConfig, ConfigError, GameConfig, PhysicsConfig, PlayerConfig};
pub use material::{Material, UnknownMaterial, srgb_to_linear};
pub use types::{BlockKey, BlockPos, CameraPose, Face, FaceIndexError};

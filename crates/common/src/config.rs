use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for the whole game. Every field has a default, so a config file
/// only needs the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub physics: PhysicsConfig,
    pub advice: AdviceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal walking speed (units/sec).
    pub speed: f32,
    /// Vertical velocity set when a jump triggers.
    pub jump_force: f32,
    /// |v.y| below this counts as standing on something.
    pub grounded_threshold: f32,
    /// Camera height above the body centre.
    pub eye_offset: f32,
    pub spawn: Vec3,
    pub radius: f32,
    /// Radians per pixel of mouse motion.
    pub look_sensitivity: f32,
    /// Maximum distance for placing and breaking blocks.
    pub reach: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            jump_force: 4.0,
            grounded_threshold: 0.05,
            eye_offset: 0.75,
            spawn: Vec3::new(0.0, 5.0, 0.0),
            radius: 0.5,
            look_sensitivity: 0.002,
            reach: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical acceleration (negative is down).
    pub gravity: f32,
    /// Height of the ground plane surface.
    pub ground_height: f32,
    /// The ground plane spans `-half_extent..=half_extent` on X and Z.
    pub ground_half_extent: f32,
    /// Simulation steps per second.
    pub tick_rate: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            ground_height: -0.5,
            ground_half_extent: 50.0,
            tick_rate: 60.0,
        }
    }
}

impl PhysicsConfig {
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Environment variable holding the API key. `API_KEY` is tried as well.
    pub api_key_env: String,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".into(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            timeout_secs: 20,
            api_key_env: "GEMINI_API_KEY".into(),
        }
    }
}

impl GameConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics.tick_rate <= 0.0 {
            return Err(ConfigError::Invalid("physics.tick_rate must be positive".into()));
        }
        if self.player.radius <= 0.0 {
            return Err(ConfigError::Invalid("player.radius must be positive".into()));
        }
        if self.player.grounded_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "player.grounded_threshold must not be negative".into(),
            ));
        }
        if self.advice.timeout_secs == 0 {
            return Err(ConfigError::Invalid("advice.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TR_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use tilerun_core::DEFAULT_TIME_STEP;
use tilerun_input::DEFAULT_HISTORY_LENGTH;
use tilerun_physics::PhysicsConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics tuning, passed straight to the physics world
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Fixed-step loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Level and entity data files
    #[serde(default)]
    pub level: LevelConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TR_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // TR_PHYSICS__GRAVITY=600 -> physics.gravity = 600.0
        figment = figment.merge(Env::prefixed("TR_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Fixed-step loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds per physics tick
    pub time_step: f32,
    /// Longest frame fed to the accumulator, in seconds
    pub max_frame_time: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            max_frame_time: 0.25,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Stick magnitude below which movement reads as neutral
    pub deadzone: f32,
    /// Frames kept in the input buffer
    pub history_length: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            deadzone: 0.2,
            history_length: DEFAULT_HISTORY_LENGTH,
        }
    }
}

/// Level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Path to the text map
    pub map_path: String,
    /// Path to the RON entity catalog
    pub entities_path: String,
    /// Catalog template spawned at the map's `@`
    pub player_template: String,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            map_path: "data/map1.txt".to_string(),
            entities_path: "data/entities.ron".to_string(),
            player_template: "player".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Keep per-tile collision diagnostics each tick
    pub collect_diagnostics: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            collect_diagnostics: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.physics.tile_width, 16.0);
        assert_eq!(config.simulation.time_step, 0.01);
        assert_eq!(config.input.history_length, 10);
        assert_eq!(config.level.player_template, "player");
        assert!(!config.debug.collect_diagnostics);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("[physics]"));
        assert!(toml.contains("fat_rect_multiplier"));
        assert!(toml.contains("map_path"));
    }

    #[test]
    fn test_partial_section() {
        let config: AppConfig = toml::from_str("[physics]\ngravity = 600.0\n").unwrap();
        assert_eq!(config.physics.gravity, 600.0);
        assert_eq!(config.physics.coyote_frames, 8);
        assert_eq!(config.simulation.max_frame_time, 0.25);
    }

    #[test]
    fn test_missing_dir_uses_defaults() {
        let config = AppConfig::load_from("does/not/exist").unwrap();
        assert_eq!(config.physics.jump_force, 30000.0);
    }
}

//! Game configuration (window, craft model, scenery, flight tables). Loaded from config.ron at startup.

use flight::FlightConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Enable vsync (recommended to avoid tearing).
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Start in borderless fullscreen.
    #[serde(default)]
    pub fullscreen: bool,
    /// Craft model (glTF or GLB).
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Uniform scale applied to the loaded model.
    #[serde(default = "default_model_scale")]
    pub model_scale: f32,
    /// Extra yaw for models authored facing a different axis.
    #[serde(default)]
    pub model_yaw_degrees: f32,
    /// Seed for the starfield and the battle station.
    #[serde(default = "default_scenery_seed")]
    pub scenery_seed: u64,
    #[serde(default)]
    pub flight: FlightConfig,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_model_path() -> PathBuf {
    PathBuf::from("assets/models/X-wing.glb")
}
fn default_model_scale() -> f32 {
    0.5
}
fn default_scenery_seed() -> u64 {
    1977
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            fullscreen: false,
            model_path: default_model_path(),
            model_scale: default_model_scale(),
            model_yaw_degrees: 0.0,
            scenery_seed: default_scenery_seed(),
            flight: FlightConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. A missing file is created with defaults; an invalid one is
    /// reported and defaults are used.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(data) => match Self::from_ron(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, writing defaults", path);
                let config = Self::default();
                config.save();
                return config;
            }
            Err(e) => log::warn!("Could not read config at {:?}: {}, using defaults", path, e),
        }
        Self::default()
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight::IntegrationMode;

    #[test]
    fn empty_config_takes_defaults() {
        let config = GameConfig::from_ron("()").expect("parse");
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.model_path, PathBuf::from("assets/models/X-wing.glb"));
        assert_eq!(config.model_scale, 0.5);
        assert_eq!(config.flight.integration, IntegrationMode::DeltaScaled);
    }

    #[test]
    fn partial_flight_table_keeps_other_defaults() {
        let config = GameConfig::from_ron(
            "(window_width: 800, flight: (integration: PerFrame, handling: (max_speed: 1.0)))",
        )
        .expect("parse");
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.flight.integration, IntegrationMode::PerFrame);
        assert_eq!(config.flight.handling.max_speed, 1.0);
        assert_eq!(config.flight.handling.drag, 0.99);
    }

    #[test]
    fn round_trips_through_ron() {
        let mut config = GameConfig::default();
        config.scenery_seed = 42;
        config.flight.weapons.cooldown = 0.5;
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).expect("serialize");
        let back = GameConfig::from_ron(&text).expect("parse");
        assert_eq!(back.scenery_seed, 42);
        assert_eq!(back.flight.weapons.cooldown, 0.5);
        assert_eq!(back.flight.weapons.muzzle_offsets, config.flight.weapons.muzzle_offsets);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(GameConfig::from_ron("window_width = 3").is_err());
    }
}

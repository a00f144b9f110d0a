//! Configuration system
//!
//! `PhysicsConfig` holds every tunable of a physics world. It can be built in
//! code or loaded from a `.toml` / `.ron` file through the [`Config`] trait.

pub use serde::{Serialize, Deserialize};

use crate::debug::CollisionDebugColors;
use crate::foundation::math::Vec3;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, picking the format from the file name
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tunables of a physics world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration applied to bodies using gravity (units / s²)
    pub gravity: Vec3,

    /// Extra distance a discrete repulsion adds so resolved boxes stop touching
    pub separation_skin: f32,

    /// Clearance added above a ledge when a body steps onto it
    pub step_epsilon: f32,

    /// Whether `draw_debug` emits anything
    pub debug_draw: bool,

    /// Colors used by debug drawing
    pub debug_colors: CollisionDebugColors,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            separation_skin: 1.0e-4,
            step_epsilon: 1.0e-3,
            debug_draw: false,
            debug_colors: CollisionDebugColors::default(),
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// Configuration without gravity, handy for top-down games and tests
    pub fn zero_gravity() -> Self {
        Self {
            gravity: Vec3::zeros(),
            ..Default::default()
        }
    }

    /// Enable or disable debug drawing (builder pattern)
    pub fn with_debug_draw(mut self, enabled: bool) -> Self {
        self.debug_draw = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip_keeps_gravity() {
        let config = PhysicsConfig {
            gravity: Vec3::new(0.0, -20.0, 0.0),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = PhysicsConfig::from_str_with_format(&text, "physics.toml").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let parsed = PhysicsConfig::from_str_with_format("(debug_draw: true)", "physics.ron").unwrap();
        assert!(parsed.debug_draw);
        assert_eq!(parsed.gravity, PhysicsConfig::default().gravity);
    }

    #[test]
    fn test_unsupported_format() {
        let result = PhysicsConfig::from_str_with_format("", "physics.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PhysicsConfig::load_from_file("definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

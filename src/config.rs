//! Walk configuration
//!
//! Loaded once at startup from TOML; every field has a default, so an empty
//! file describes the stock 5×5 world.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::coordinator::DEFAULT_IMAGE_SIZE;
use crate::grid::PromptGrid;
use crate::prompt::{DEFAULT_MAX_TOKENS, DEFAULT_SEPARATOR};
use crate::spatial::DEFAULT_KEY_RESOLUTION;
use crate::view::DEFAULT_REGENERATE_DISTANCE;

/// Error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for one walk session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Prompt table, `grid[x][y]`
    pub grid: PromptGrid,
    /// Starting position in grid units
    pub start: Vec2,
    /// Grid units moved per frame while a movement key is held
    pub move_speed: f32,
    /// Degrees turned per unit of look input
    pub look_sensitivity: f32,
    /// Minimum travel since the last request before producing again
    pub regenerate_distance: f32,
    /// Cache key cells per grid unit
    pub key_resolution: u32,
    /// Token budget for blended requests
    pub max_prompt_tokens: u32,
    /// Separator between blended labels
    pub separator: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Control loop rate
    pub target_fps: u32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            grid: PromptGrid::default(),
            start: Vec2::new(2.5, 2.5),
            move_speed: 0.05,
            look_sensitivity: 0.1,
            regenerate_distance: DEFAULT_REGENERATE_DISTANCE,
            key_resolution: DEFAULT_KEY_RESOLUTION,
            max_prompt_tokens: DEFAULT_MAX_TOKENS,
            separator: DEFAULT_SEPARATOR.to_string(),
            image_width: DEFAULT_IMAGE_SIZE,
            image_height: DEFAULT_IMAGE_SIZE,
            target_fps: 60,
        }
    }
}

impl WalkConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject values the pipeline cannot run with
    ///
    /// Grid shape is already checked during deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if !self.start.is_finite() {
            return Err(invalid("start", "must be finite"));
        }
        if !self.move_speed.is_finite() || self.move_speed < 0.0 {
            return Err(invalid("move_speed", "must be a non-negative number"));
        }
        if !self.look_sensitivity.is_finite() {
            return Err(invalid("look_sensitivity", "must be finite"));
        }
        if !self.regenerate_distance.is_finite() || self.regenerate_distance < 0.0 {
            return Err(invalid("regenerate_distance", "must be a non-negative number"));
        }
        if self.key_resolution == 0 {
            return Err(invalid("key_resolution", "must be at least 1"));
        }
        if self.max_prompt_tokens == 0 {
            return Err(invalid("max_prompt_tokens", "must be at least 1"));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(invalid("image_width/image_height", "must be at least 1"));
        }
        if self.target_fps == 0 {
            return Err(invalid("target_fps", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = WalkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.width(), 5);
        assert_eq!(config.start, Vec2::new(2.5, 2.5));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = WalkConfig::from_toml_str("").unwrap();
        assert_eq!(config, WalkConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = WalkConfig::from_toml_str(
            r#"
            start = [0.5, 1.0]
            move_speed = 0.2
            target_fps = 30
            grid = [["a", "b"], ["c", "d"], ["e", "f"]]
            "#,
        )
        .unwrap();
        assert_eq!(config.start, Vec2::new(0.5, 1.0));
        assert_eq!(config.move_speed, 0.2);
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.grid.width(), 3);
        assert_eq!(config.grid.height(), 2);
        assert_eq!(config.grid.label(2, 1).unwrap(), "f");
    }

    #[test]
    fn test_rejects_ragged_grid() {
        let result = WalkConfig::from_toml_str(r#"grid = [["a", "b"], ["c"]]"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_zero_resolution() {
        let result = WalkConfig::from_toml_str("key_resolution = 0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "key_resolution",
                ..
            })
        ));
    }
}

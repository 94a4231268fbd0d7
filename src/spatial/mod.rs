//! Continuous positions, orientations and quantized cache keys
//!
//! Positions live on the prompt grid: `[0, width-1] × [0, height-1]`.
//! Cache keys are positions scaled by a fixed resolution and truncated.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of key cells per grid unit (0.1-unit key cells)
pub const DEFAULT_KEY_RESOLUTION: u32 = 10;

/// Pitch limit in degrees; looking further would flip the view
pub const PITCH_LIMIT: f32 = 90.0;

/// Inclusive bounds of the walkable area, derived from grid dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBounds {
    pub max: Vec2,
}

impl GridBounds {
    /// Bounds for a grid of `width × height` cells
    pub fn for_grid(width: usize, height: usize) -> Self {
        Self {
            max: Vec2::new(
                width.saturating_sub(1) as f32,
                height.saturating_sub(1) as f32,
            ),
        }
    }

    /// Clamp a position into the bounds
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        position.clamp(Vec2::ZERO, self.max)
    }

    /// Check whether a position lies within the bounds
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x <= self.max.x
            && position.y <= self.max.y
    }
}

/// View direction in degrees
///
/// Yaw accumulates without wrapping; pitch is kept within ±[`PITCH_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    /// Apply a look delta (`x` = yaw, `y` = pitch)
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw += delta.x;
        self.pitch = (self.pitch + delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Rotate a planar movement vector by the current yaw
    pub fn rotate_movement(&self, direction: Vec2) -> Vec2 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec2::new(
            direction.x * cos - direction.y * sin,
            direction.x * sin + direction.y * cos,
        )
    }
}

/// Quantized position used to address the content cache
///
/// Two positions inside the same `1 / resolution` cell share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub x: i32,
    pub y: i32,
}

impl CacheKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Derive the key for a position by scaling and truncating
    pub fn quantize(position: Vec2, resolution: u32) -> Self {
        let scaled = position * resolution as f32;
        Self {
            x: scaled.x as i32,
            y: scaled.y as i32,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

//! Spatial prompt blending
//!
//! Turns a continuous grid position into a single, length-bounded content
//! request by bilinearly weighting the labels of the four surrounding cells.

pub mod tokenizer;

pub use tokenizer::{Tokenizer, WordTokenizer};

use glam::Vec2;
use std::fmt;

use crate::grid::{GridError, PromptGrid};

/// Separator placed between blended labels
pub const DEFAULT_SEPARATOR: &str = " | ";

/// Default token budget, matching the context length of CLIP text encoders
pub const DEFAULT_MAX_TOKENS: u32 = 77;

/// Blended text handed to the content producer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRequest {
    text: String,
}

impl ContentRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for ContentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The four cells around a position and their bilinear weights
///
/// Entries are ordered `[00, 10, 01, 11]`: origin cell, +x neighbour,
/// +y neighbour, diagonal neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub cells: [(usize, usize); 4],
    pub weights: [f32; 4],
}

impl BlendWeights {
    /// Compute the surrounding cells and weights for a position
    pub fn at(position: Vec2, grid: &PromptGrid) -> Result<Self, GridError> {
        if !grid.bounds().contains(position) {
            return Err(GridError::PositionOutOfBounds {
                x: position.x,
                y: position.y,
            });
        }

        let origin = position.floor();
        let (x0, y0) = (origin.x as usize, origin.y as usize);
        let x1 = (x0 + 1).min(grid.width() - 1);
        let y1 = (y0 + 1).min(grid.height() - 1);
        let t = position - origin;

        Ok(Self {
            cells: [(x0, y0), (x1, y0), (x0, y1), (x1, y1)],
            weights: [
                (1.0 - t.x) * (1.0 - t.y),
                t.x * (1.0 - t.y),
                (1.0 - t.x) * t.y,
                t.x * t.y,
            ],
        })
    }
}

/// Builds content requests from grid positions
#[derive(Debug, Clone)]
pub struct SpatialPromptBlender<T: Tokenizer = WordTokenizer> {
    tokenizer: T,
    separator: String,
}

impl Default for SpatialPromptBlender<WordTokenizer> {
    fn default() -> Self {
        Self::new(WordTokenizer::new())
    }
}

impl<T: Tokenizer> SpatialPromptBlender<T> {
    pub fn new(tokenizer: T) -> Self {
        Self {
            tokenizer,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Use a different separator between labels
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Blend the labels around `position` into one request
    ///
    /// Labels with a positive weight are joined in `[00, 10, 01, 11]` order.
    /// Joining stops before the label that would push the token length past
    /// `max_tokens`; the first label is always kept, so the request is never
    /// empty.
    pub fn blend(
        &self,
        position: Vec2,
        grid: &PromptGrid,
        max_tokens: u32,
    ) -> Result<ContentRequest, GridError> {
        let blend = BlendWeights::at(position, grid)?;
        let mut text = String::new();

        for (&(x, y), &weight) in blend.cells.iter().zip(blend.weights.iter()) {
            if weight <= 0.0 {
                continue;
            }
            let label = grid.label(x, y)?;

            if text.is_empty() {
                text.push_str(label);
                continue;
            }

            let candidate = format!("{text}{}{label}", self.separator);
            if self.tokenizer.token_length(&candidate) > max_tokens {
                log::debug!(
                    "Prompt at ({:.2}, {:.2}) truncated before '{label}'",
                    position.x,
                    position.y
                );
                break;
            }
            text = candidate;
        }

        Ok(ContentRequest::new(text))
    }
}

//! Static prompt table addressed by integer grid cells

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spatial::GridBounds;

/// Error type for prompt grid construction and lookup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Grid has no cells")]
    Empty,

    #[error("Grid column {column} has {found} cells, expected {expected}")]
    Ragged {
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("Cell ({x}, {y}) is outside a {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Position ({x}, {y}) is outside the grid")]
    PositionOutOfBounds { x: f32, y: f32 },
}

/// Thematic label for every grid cell
///
/// Cells are stored column-major: `cells[x][y]`. The table is fixed at
/// startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct PromptGrid {
    cells: Vec<Vec<String>>,
    height: usize,
}

impl PromptGrid {
    /// Build a grid from columns of labels
    pub fn new(cells: Vec<Vec<String>>) -> Result<Self, GridError> {
        let height = cells.first().map(Vec::len).unwrap_or(0);
        if height == 0 {
            return Err(GridError::Empty);
        }

        if let Some((column, found)) = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.len()))
            .find(|&(_, len)| len != height)
        {
            return Err(GridError::Ragged {
                column,
                expected: height,
                found,
            });
        }

        Ok(Self { cells, height })
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Walkable bounds for this grid
    pub fn bounds(&self) -> GridBounds {
        GridBounds::for_grid(self.width(), self.height())
    }

    /// Label at cell `(x, y)`
    pub fn label(&self, x: usize, y: usize) -> Result<&str, GridError> {
        self.cells
            .get(x)
            .and_then(|column| column.get(y))
            .map(String::as_str)
            .ok_or(GridError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
    }
}

impl Default for PromptGrid {
    /// The 5×5 world used by the demo walk
    fn default() -> Self {
        let columns: [[&str; 5]; 5] = [
            [
                "A futuristic cityscape",
                "A serene beach",
                "A dense forest",
                "A snowy mountain",
                "A desert landscape",
            ],
            [
                "An underwater coral reef",
                "A bustling medieval market",
                "An alien planet",
                "A magical floating castle",
                "A volcanic landscape",
            ],
            [
                "A night sky with galaxies",
                "A sunflower field",
                "An abstract painting",
                "A futuristic spaceship interior",
                "A peaceful Japanese garden",
            ],
            [
                "A haunted house on a hill",
                "A tropical rainforest",
                "A cyberpunk street scene",
                "An ice cave with crystals",
                "A grassy meadow with wildflowers",
            ],
            [
                "An ancient temple in the jungle",
                "A futuristic laboratory",
                "A mystical swamp with glowing plants",
                "A grand library with endless shelves",
                "An open ocean with whales",
            ],
        ];

        Self {
            cells: columns
                .iter()
                .map(|column| column.iter().map(|s| s.to_string()).collect())
                .collect(),
            height: 5,
        }
    }
}

impl TryFrom<Vec<Vec<String>>> for PromptGrid {
    type Error = GridError;

    fn try_from(cells: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        Self::new(cells)
    }
}

impl From<PromptGrid> for Vec<Vec<String>> {
    fn from(grid: PromptGrid) -> Self {
        grid.cells
    }
}

//! Grid to world mapping
//!
//! The maze is centered in the viewport. Cell size fits the grid in both of
//! its orientations so a quarter turn never changes the scale, and the maze
//! center is always the viewport center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{GridPos, OccupancyGrid};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Viewport size in pixels
    pub viewport: Vec2,
    /// Pixels per cell
    pub cell_size: f32,
}

impl GridLayout {
    /// Fit a `rows` x `cols` grid (and its transpose) into the viewport
    pub fn fit(viewport: Vec2, rows: usize, cols: usize) -> Self {
        let longest = rows.max(cols).max(1) as f32;
        Self {
            viewport,
            cell_size: viewport.x.min(viewport.y) / longest,
        }
    }

    /// Maze center in world space
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    /// World position of the grid's top-left corner
    pub fn origin(&self, grid: &OccupancyGrid) -> Vec2 {
        let size = Vec2::new(grid.cols() as f32, grid.rows() as f32) * self.cell_size;
        (self.viewport - size) * 0.5
    }

    /// Grid cell containing a world point, `None` outside the grid
    pub fn cell_at(&self, grid: &OccupancyGrid, pos: Vec2) -> Option<GridPos> {
        let (row, col) = self.signed_cell_at(grid, pos);
        if row < 0 || col < 0 {
            return None;
        }
        let cell = GridPos::new(row as usize, col as usize);
        grid.contains(cell).then_some(cell)
    }

    /// Grid coordinates of a world point without bounds checks
    pub fn signed_cell_at(&self, grid: &OccupancyGrid, pos: Vec2) -> (i64, i64) {
        let local = (pos - self.origin(grid)) / self.cell_size;
        (local.y.floor() as i64, local.x.floor() as i64)
    }

    /// World position of a cell's center
    pub fn cell_center(&self, grid: &OccupancyGrid, cell: GridPos) -> Vec2 {
        self.origin(grid) + (Vec2::new(cell.col as f32, cell.row as f32) + 0.5) * self.cell_size
    }

    /// True when the point lies on a passage cell of `grid`
    pub fn is_free(&self, grid: &OccupancyGrid, pos: Vec2) -> bool {
        self.cell_at(grid, pos).is_some_and(|c| grid.is_passage(c))
    }
}

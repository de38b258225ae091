//! Occupancy grid and quarter-turn rotations
//!
//! Row-major cells. `GridPos` uses (row, col); in world space col runs along +x
//! and row along +y (screen-down).

use serde::{Deserialize, Serialize};

/// A single maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Passage,
}

/// Grid coordinates of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Quarter-turn direction (as seen on screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Clockwise,
    CounterClockwise,
}

impl Turn {
    /// Where a cell of a `rows` x `cols` grid lands after one quarter turn
    pub fn apply_to_cell(self, pos: GridPos, rows: usize, cols: usize) -> GridPos {
        match self {
            Turn::Clockwise => GridPos::new(pos.col, rows - 1 - pos.row),
            Turn::CounterClockwise => GridPos::new(cols - 1 - pos.col, pos.row),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::CounterClockwise => Turn::Clockwise,
        }
    }
}

/// Rectangular wall/passage grid, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    /// Grid with every cell set to `fill`
    pub fn filled(rows: usize, cols: usize, fill: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    /// Build from row strings: `#` is a wall, anything else a passage.
    /// Returns `None` for empty or ragged input.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let cols = rows.first()?.chars().count();
        if cols == 0 || rows.iter().any(|r| r.chars().count() != cols) {
            return None;
        }
        let cells = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|c| if c == '#' { Cell::Wall } else { Cell::Passage })
            .collect();
        Some(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Cell at `pos`, `None` outside the grid
    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<Cell> {
        self.contains(pos)
            .then(|| self.cells[pos.row * self.cols + pos.col])
    }

    /// Cell at signed coordinates, `None` outside the grid
    pub fn get_signed(&self, row: i64, col: i64) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(GridPos::new(row as usize, col as usize))
    }

    pub fn is_passage(&self, pos: GridPos) -> bool {
        self.get(pos) == Some(Cell::Passage)
    }

    pub fn is_wall(&self, pos: GridPos) -> bool {
        self.get(pos) == Some(Cell::Wall)
    }

    pub(crate) fn set(&mut self, pos: GridPos, cell: Cell) {
        if self.contains(pos) {
            self.cells[pos.row * self.cols + pos.col] = cell;
        }
    }

    /// All passage cells in row-major order
    pub fn passages(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Passage)
            .map(|(i, _)| GridPos::new(i / self.cols, i % self.cols))
    }

    /// First passage in row-major order
    pub fn first_passage(&self) -> Option<GridPos> {
        self.passages().next()
    }

    /// Nearest passage by expanding square (Chebyshev) rings around `from`.
    /// `from` may lie outside the grid; it is clamped first. Falls back to
    /// the first passage in row-major order.
    pub fn nearest_passage(&self, from: GridPos) -> Option<GridPos> {
        if self.rows == 0 || self.cols == 0 {
            return None;
        }
        let row = from.row.min(self.rows - 1) as i64;
        let col = from.col.min(self.cols - 1) as i64;
        if self.get_signed(row, col) == Some(Cell::Passage) {
            return Some(GridPos::new(row as usize, col as usize));
        }

        let max_radius = self.rows.max(self.cols) as i64;
        for radius in 1..max_radius {
            for dc in -radius..=radius {
                for dr in -radius..=radius {
                    if dc.abs() != radius && dr.abs() != radius {
                        continue;
                    }
                    if self.get_signed(row + dr, col + dc) == Some(Cell::Passage) {
                        return Some(GridPos::new((row + dr) as usize, (col + dc) as usize));
                    }
                }
            }
        }
        log::warn!("No passage within reach of {:?}, using row-major fallback", from);
        self.first_passage()
    }

    /// The passage on the outer boundary, scanning the bottom row right to
    /// left first, then the right, top and left edges
    pub fn boundary_exit(&self) -> Option<GridPos> {
        if self.rows == 0 || self.cols == 0 {
            return None;
        }
        let (last_row, last_col) = (self.rows - 1, self.cols - 1);
        let bottom = (0..self.cols).rev().map(|c| GridPos::new(last_row, c));
        let right = (0..self.rows).rev().map(|r| GridPos::new(r, last_col));
        let top = (0..self.cols).rev().map(|c| GridPos::new(0, c));
        let left = (0..self.rows).rev().map(|r| GridPos::new(r, 0));
        bottom
            .chain(right)
            .chain(top)
            .chain(left)
            .find(|&p| self.is_passage(p))
    }

    /// One quarter turn; the result has transposed dimensions
    pub fn turned(&self, turn: Turn) -> Self {
        let mut out = Self::filled(self.cols, self.rows, Cell::Wall);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let src = GridPos::new(row, col);
                let dst = turn.apply_to_cell(src, self.rows, self.cols);
                out.cells[dst.row * out.cols + dst.col] = self.cells[row * self.cols + col];
            }
        }
        out
    }

    /// Rotate clockwise by `quarter_turns * 90` degrees
    pub fn rotated_cw(&self, quarter_turns: u8) -> Self {
        match quarter_turns % 4 {
            0 => self.clone(),
            1 => self.turned(Turn::Clockwise),
            2 => self.half_turned(),
            _ => self.turned(Turn::CounterClockwise),
        }
    }

    fn half_turned(&self) -> Self {
        let mut out = Self::filled(self.rows, self.cols, Cell::Wall);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let dst = (self.rows - 1 - row) * self.cols + (self.cols - 1 - col);
                out.cells[dst] = self.cells[row * self.cols + col];
            }
        }
        out
    }
}

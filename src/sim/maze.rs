//! Procedural maze generation
//!
//! Randomized depth-first carve on a 2-cell lattice: rooms sit on odd
//! coordinates, the cell between two rooms is opened when the carve moves
//! between them. The recursion is run on an explicit stack so large mazes
//! cannot overflow the call stack; the RNG draw order is the same as the
//! recursive form (one shuffle per visited room, on entry).

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::{Cell, GridPos, OccupancyGrid};
use crate::consts::{MAX_ROOMS, MIN_ROOMS};
use crate::error::{Error, Result};

/// Up, right, down, left as (row, col) steps of two cells
const DIRECTIONS: [(i64, i64); 4] = [(-2, 0), (0, 2), (2, 0), (0, -2)];

/// Carving starts here
pub const START: GridPos = GridPos::new(1, 1);

/// One suspended call of the carve
struct Frame {
    row: i64,
    col: i64,
    order: [usize; 4],
    next: usize,
}

/// Maze generator for `rooms_wide` x `rooms_high` rooms
#[derive(Debug, Clone, Copy)]
pub struct MazeGenerator {
    rooms_wide: usize,
    rooms_high: usize,
}

impl MazeGenerator {
    /// Fails fast on sizes that cannot produce a playable maze
    pub fn new(rooms_wide: usize, rooms_high: usize) -> Result<Self> {
        let valid = (MIN_ROOMS..=MAX_ROOMS).contains(&rooms_wide)
            && (MIN_ROOMS..=MAX_ROOMS).contains(&rooms_high);
        if !valid {
            return Err(Error::InvalidMazeSize {
                rooms_wide,
                rooms_high,
                min: MIN_ROOMS,
                max: MAX_ROOMS,
            });
        }
        Ok(Self {
            rooms_wide,
            rooms_high,
        })
    }

    /// Grid height in cells
    pub fn rows(&self) -> usize {
        2 * self.rooms_high + 1
    }

    /// Grid width in cells
    pub fn cols(&self) -> usize {
        2 * self.rooms_wide + 1
    }

    /// Carve a maze drawing from the caller's RNG
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<OccupancyGrid> {
        let mut grid = OccupancyGrid::filled(self.rows(), self.cols(), Cell::Wall);
        self.carve(&mut grid, rng);
        self.open_exit(&mut grid)?;
        Ok(grid)
    }

    fn in_interior(&self, row: i64, col: i64) -> bool {
        row > 0 && col > 0 && row < self.rows() as i64 - 1 && col < self.cols() as i64 - 1
    }

    fn carve<R: Rng + ?Sized>(&self, grid: &mut OccupancyGrid, rng: &mut R) {
        let enter = |row: i64, col: i64, grid: &mut OccupancyGrid, rng: &mut R| {
            grid.set(GridPos::new(row as usize, col as usize), Cell::Passage);
            let mut order = [0, 1, 2, 3];
            order.shuffle(rng);
            Frame {
                row,
                col,
                order,
                next: 0,
            }
        };

        let mut stack = vec![enter(START.row as i64, START.col as i64, grid, rng)];
        while let Some(frame) = stack.last_mut() {
            if frame.next == DIRECTIONS.len() {
                stack.pop();
                continue;
            }
            let (dr, dc) = DIRECTIONS[frame.order[frame.next]];
            frame.next += 1;

            let (row, col) = (frame.row, frame.col);
            let (nr, nc) = (row + dr, col + dc);
            if self.in_interior(nr, nc) && grid.get_signed(nr, nc) == Some(Cell::Wall) {
                let between = GridPos::new((row + dr / 2) as usize, (col + dc / 2) as usize);
                grid.set(between, Cell::Passage);
                let child = enter(nr, nc, grid, rng);
                stack.push(child);
            }
        }
    }

    /// Open the boundary below the right-most passage of the second-to-last row
    fn open_exit(&self, grid: &mut OccupancyGrid) -> Result<GridPos> {
        let row = self.rows() - 2;
        let col = (1..self.cols() - 1)
            .rev()
            .find(|&c| grid.is_passage(GridPos::new(row, c)))
            .ok_or(Error::NoExit)?;
        let exit = GridPos::new(row + 1, col);
        grid.set(exit, Cell::Passage);
        Ok(exit)
    }
}

/// Generate a reproducible maze from a seed
pub fn generate_maze(rooms_wide: usize, rooms_high: usize, seed: u64) -> Result<OccupancyGrid> {
    let generator = MazeGenerator::new(rooms_wide, rooms_high)?;
    let mut rng = Pcg32::seed_from_u64(seed);
    let grid = generator.generate(&mut rng)?;
    log::info!(
        "Maze generated: {}x{} rooms ({}x{} cells), seed {}",
        rooms_wide,
        rooms_high,
        grid.cols(),
        grid.rows(),
        seed
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashSet, VecDeque};

    fn reachable(grid: &OccupancyGrid, from: GridPos) -> HashSet<GridPos> {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(p) = queue.pop_front() {
            for (dr, dc) in [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)] {
                let (r, c) = (p.row as i64 + dr, p.col as i64 + dc);
                if grid.get_signed(r, c) == Some(Cell::Passage) {
                    let q = GridPos::new(r as usize, c as usize);
                    if seen.insert(q) {
                        queue.push_back(q);
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn test_rejects_degenerate_sizes() {
        assert!(matches!(
            generate_maze(1, 1, 42),
            Err(Error::InvalidMazeSize { .. })
        ));
        assert!(MazeGenerator::new(5, 0).is_err());
        assert!(MazeGenerator::new(MAX_ROOMS + 1, 4).is_err());
    }

    #[test]
    fn test_dimensions_and_start() {
        let grid = generate_maze(5, 3, 42).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (7, 11));
        assert!(grid.is_passage(START));
    }

    #[test]
    fn test_seed_is_reproducible() {
        assert_eq!(generate_maze(6, 6, 7).unwrap(), generate_maze(6, 6, 7).unwrap());
        assert_ne!(generate_maze(6, 6, 7).unwrap(), generate_maze(6, 6, 8).unwrap());
    }

    #[test]
    fn test_single_exit_on_bottom_boundary() {
        let grid = generate_maze(5, 5, 42).unwrap();
        let exit = grid.boundary_exit().unwrap();
        assert_eq!(exit.row, grid.rows() - 1);
        let boundary_passages = grid
            .passages()
            .filter(|p| p.row == 0 || p.col == 0 || p.row == grid.rows() - 1 || p.col == grid.cols() - 1)
            .count();
        assert_eq!(boundary_passages, 1);
    }

    #[test]
    fn test_every_room_is_carved() {
        let grid = generate_maze(8, 4, 3).unwrap();
        for row in (1..grid.rows()).step_by(2) {
            for col in (1..grid.cols()).step_by(2) {
                assert!(grid.is_passage(GridPos::new(row, col)));
            }
        }
    }

    #[test]
    fn test_generate_from_injected_rng() {
        let generator = MazeGenerator::new(4, 4).unwrap();
        let mut a = Pcg32::seed_from_u64(9);
        let mut b = Pcg32::seed_from_u64(9);
        assert_eq!(generator.generate(&mut a).unwrap(), generator.generate(&mut b).unwrap());
    }

    proptest! {
        #[test]
        fn prop_passages_connected_to_start_and_exit(
            seed in any::<u64>(),
            wide in 2usize..12,
            high in 2usize..12,
        ) {
            let grid = generate_maze(wide, high, seed).unwrap();
            let exit = grid.boundary_exit().unwrap();
            let seen = reachable(&grid, START);
            prop_assert!(seen.contains(&exit));
            prop_assert_eq!(seen.len(), grid.passages().count());
        }
    }
}

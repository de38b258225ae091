//! Maze state machine: lucidity band -> active configuration
//!
//! A transition swaps the active grid one quarter turn at a time and carries
//! the exit marker, the ball and every bonus along so they keep their place
//! relative to the maze.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bonus::BonusSpawner;
use super::configs::{ConfigState, MazeConfigurationSet};
use super::grid::{GridPos, OccupancyGrid, Turn};
use super::layout::GridLayout;
use super::lucidity::Lucidity;
use super::motion::Ball;
use crate::error::{Error, Result};

/// A completed reconfiguration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: ConfigState,
    pub to: ConfigState,
    pub turn: Turn,
    /// Quarter turns taken
    pub steps: usize,
    /// The ball landed on a wall and was moved to the nearest passage
    pub ball_snapped: bool,
    /// Bonuses dropped for landing on a wall
    pub bonuses_dropped: usize,
}

/// Quarter turn of a world point about `center` (screen space, y down)
pub fn rotate_about(pos: Vec2, center: Vec2, turn: Turn) -> Vec2 {
    let d = pos - center;
    let turned = match turn {
        Turn::Clockwise => Vec2::new(-d.y, d.x),
        Turn::CounterClockwise => Vec2::new(d.y, -d.x),
    };
    center + turned
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeStateMachine {
    configs: MazeConfigurationSet,
    state: ConfigState,
    /// Exit marker in the active grid's coordinates
    exit: GridPos,
}

impl MazeStateMachine {
    /// Start in the canonical configuration with the exit on its boundary
    pub fn new(canonical: OccupancyGrid) -> Result<Self> {
        let exit = canonical.boundary_exit().ok_or(Error::NoExit)?;
        Ok(Self {
            configs: MazeConfigurationSet::new(canonical),
            state: ConfigState::Config0,
            exit,
        })
    }

    pub fn state(&self) -> ConfigState {
        self.state
    }

    pub fn exit(&self) -> GridPos {
        self.exit
    }

    pub fn configs(&self) -> &MazeConfigurationSet {
        &self.configs
    }

    #[inline]
    pub fn active_grid(&self) -> &OccupancyGrid {
        self.configs.get(self.state)
    }

    /// Configuration the current lucidity calls for
    pub fn target(lucidity: &Lucidity) -> ConfigState {
        ConfigState::for_band(lucidity.band())
    }

    /// Follow the lucidity band. Rotates exit, ball and bonuses in lock-step
    /// with each quarter turn, then heals anything that landed on a wall.
    pub fn update(
        &mut self,
        lucidity: &Lucidity,
        layout: &GridLayout,
        ball: &mut Ball,
        bonuses: &mut BonusSpawner,
    ) -> Option<Transition> {
        let from = self.state;
        let (turn, steps) = from.path_to(Self::target(lucidity))?;
        let center = layout.center();

        for _ in 0..steps {
            let grid = self.active_grid();
            self.exit = turn.apply_to_cell(self.exit, grid.rows(), grid.cols());
            ball.pos = rotate_about(ball.pos, center, turn);
            bonuses.transform_positions(|p| rotate_about(p, center, turn));
            self.state = self.state.turned(turn);
        }

        let ball_snapped = self.settle_ball(layout, ball);
        let bonuses_dropped = bonuses.drop_walled(self.active_grid(), layout);

        let transition = Transition {
            from,
            to: self.state,
            turn,
            steps,
            ball_snapped,
            bonuses_dropped,
        };
        log::debug!(
            "Maze {:?} -> {:?} ({} x {:?}), {} bonus(es) dropped",
            from,
            self.state,
            steps,
            turn,
            bonuses_dropped
        );
        Some(transition)
    }

    /// Snap the ball to the nearest passage if it sits on a wall or off
    /// the grid. Returns whether it moved.
    pub fn settle_ball(&self, layout: &GridLayout, ball: &mut Ball) -> bool {
        let grid = self.active_grid();
        if layout.is_free(grid, ball.pos) {
            return false;
        }
        let (row, col) = layout.signed_cell_at(grid, ball.pos);
        let from = GridPos::new(row.max(0) as usize, col.max(0) as usize);
        match grid.nearest_passage(from) {
            Some(cell) => {
                let target = layout.cell_center(grid, cell);
                log::warn!("Ball at {:?} landed on a wall, snapped to {:?}", ball.pos, cell);
                ball.pos = target;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BonusSettings;
    use crate::sim::bonus::Bonus;
    use crate::sim::maze::generate_maze;

    fn setup(seed: u64) -> (MazeStateMachine, GridLayout) {
        let machine = MazeStateMachine::new(generate_maze(5, 5, seed).unwrap()).unwrap();
        let grid = machine.active_grid();
        let layout = GridLayout::fit(Vec2::new(800.0, 600.0), grid.rows(), grid.cols());
        (machine, layout)
    }

    fn lucidity(value: f32) -> Lucidity {
        Lucidity::new(value, 0.0)
    }

    #[test]
    fn test_rotate_about_is_quarter_turn() {
        let c = Vec2::new(10.0, 10.0);
        let p = Vec2::new(13.0, 10.0);
        // Right of center turns to below it (clockwise on screen)
        assert_eq!(rotate_about(p, c, Turn::Clockwise), Vec2::new(10.0, 13.0));
        assert_eq!(rotate_about(p, c, Turn::CounterClockwise), Vec2::new(10.0, 7.0));
        let back = rotate_about(rotate_about(p, c, Turn::Clockwise), c, Turn::CounterClockwise);
        assert_eq!(back, p);
    }

    #[test]
    fn test_no_transition_within_band() {
        let (mut machine, layout) = setup(1);
        let mut ball = Ball::new(layout.cell_center(machine.active_grid(), GridPos::new(1, 1)), 12.0);
        let mut bonuses = BonusSpawner::new(BonusSettings::default()).unwrap();
        assert_eq!(machine.update(&lucidity(0.9), &layout, &mut ball, &mut bonuses), None);
        assert_eq!(machine.state(), ConfigState::Config0);
    }

    #[test]
    fn test_exit_and_ball_follow_the_grid() {
        let (mut machine, layout) = setup(42);
        let start = GridPos::new(1, 1);
        let mut ball = Ball::new(layout.cell_center(machine.active_grid(), start), 12.0);
        let mut bonuses = BonusSpawner::new(BonusSettings::default()).unwrap();

        let t = machine
            .update(&lucidity(0.1), &layout, &mut ball, &mut bonuses)
            .unwrap();
        assert_eq!((t.from, t.to, t.turn, t.steps), (ConfigState::Config0, ConfigState::Config3, Turn::Clockwise, 3));
        assert!(!t.ball_snapped);

        let grid = machine.active_grid();
        assert!(grid.is_passage(machine.exit()));
        let expected = machine
            .configs()
            .canonical()
            .rotated_cw(3)
            .boundary_exit();
        assert_eq!(Some(machine.exit()), expected);

        // Three clockwise turns == one counter-clockwise turn of the start cell
        let rows = machine.configs().canonical().rows();
        let cols = machine.configs().canonical().cols();
        let cell = Turn::CounterClockwise.apply_to_cell(start, rows, cols);
        assert!((ball.pos - layout.cell_center(grid, cell)).length() < 1e-3);
        assert_eq!(layout.cell_at(grid, ball.pos), Some(cell));
    }

    #[test]
    fn test_round_trip_restores_everything() {
        let (mut machine, layout) = setup(9);
        let start = layout.cell_center(machine.active_grid(), GridPos::new(3, 5));
        let mut ball = Ball::new(start, 12.0);
        let mut bonuses = BonusSpawner::new(BonusSettings::default()).unwrap();
        let exit = machine.exit();

        machine.update(&lucidity(0.4), &layout, &mut ball, &mut bonuses);
        assert_eq!(machine.state(), ConfigState::Config2);
        let back = machine
            .update(&lucidity(1.0), &layout, &mut ball, &mut bonuses)
            .unwrap();
        assert_eq!(back.turn, Turn::CounterClockwise);
        assert_eq!(machine.state(), ConfigState::Config0);
        assert_eq!(machine.exit(), exit);
        assert!((ball.pos - start).length() < 1e-3);
    }

    #[test]
    fn test_ball_on_wall_is_snapped() {
        let (mut machine, layout) = setup(3);
        // Corner wall cell: after any turn it is still a wall
        let mut ball = Ball::new(layout.cell_center(machine.active_grid(), GridPos::new(0, 0)), 12.0);
        let mut bonuses = BonusSpawner::new(BonusSettings::default()).unwrap();
        let t = machine
            .update(&lucidity(0.6), &layout, &mut ball, &mut bonuses)
            .unwrap();
        assert!(t.ball_snapped);
        assert!(layout.is_free(machine.active_grid(), ball.pos));
    }

    #[test]
    fn test_walled_bonus_is_dropped() {
        let canonical = OccupancyGrid::from_rows(&["#####", "#...#", "#.###", "#.#.#", "###.#"]).unwrap();
        let mut machine = MazeStateMachine::new(canonical).unwrap();
        let grid = machine.active_grid();
        let layout = GridLayout::fit(Vec2::splat(100.0), grid.rows(), grid.cols());
        let mut ball = Ball::new(layout.cell_center(grid, GridPos::new(1, 1)), 4.0);

        let mut bonuses = BonusSpawner::new(BonusSettings::default()).unwrap();
        for (id, cell) in [(1, GridPos::new(1, 3)), (2, GridPos::new(2, 2)), (3, GridPos::new(3, 1))] {
            bonuses.insert_for_test(Bonus {
                id,
                pos: layout.cell_center(grid, cell),
                value: 0.3,
                radius: 8.0,
                active: true,
            });
        }

        let t = machine
            .update(&lucidity(0.6), &layout, &mut ball, &mut bonuses)
            .unwrap();
        assert_eq!(t.bonuses_dropped, 1);
        let ids: Vec<u32> = bonuses.bonuses().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 3]);
        // Survivors sit on the turned cells
        let turned = machine.active_grid();
        assert_eq!(layout.cell_at(turned, bonuses.bonuses()[0].pos), Some(GridPos::new(3, 3)));
        assert_eq!(layout.cell_at(turned, bonuses.bonuses()[1].pos), Some(GridPos::new(1, 1)));
    }

    #[test]
    fn test_missing_exit_is_rejected() {
        let closed = OccupancyGrid::from_rows(&["###", "#.#", "###"]).unwrap();
        assert!(matches!(MazeStateMachine::new(closed), Err(Error::NoExit)));
    }
}

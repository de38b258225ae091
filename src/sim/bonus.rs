//! Collectible bonuses that restore lucidity
//!
//! The spawner owns the active set. Grid, layout and ball position are
//! borrowed per call.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{GridPos, OccupancyGrid};
use super::layout::GridLayout;
use crate::error::Result;
use crate::settings::BonusSettings;

/// A collectible bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    pub id: u32,
    /// World position (center of the cell it spawned on)
    pub pos: Vec2,
    /// Lucidity restored on pickup
    pub value: f32,
    pub radius: f32,
    pub active: bool,
}

impl Bonus {
    /// Circle overlap with the ball
    pub fn touches(&self, ball_pos: Vec2, ball_radius: f32) -> bool {
        let reach = self.radius + ball_radius;
        self.active && self.pos.distance_squared(ball_pos) < reach * reach
    }
}

/// Lazily sampled spawn candidates, capped at `attempts`
pub fn candidate_cells<'a, R: Rng + ?Sized>(
    rng: &'a mut R,
    rows: usize,
    cols: usize,
    attempts: usize,
) -> impl Iterator<Item = GridPos> + 'a {
    std::iter::repeat_with(move || GridPos::new(rng.random_range(0..rows), rng.random_range(0..cols)))
        .take(if rows == 0 || cols == 0 { 0 } else { attempts })
}

/// Maintains the bounded set of active bonuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusSpawner {
    settings: BonusSettings,
    bonuses: Vec<Bonus>,
    frames_since_spawn: u32,
    next_id: u32,
}

impl BonusSpawner {
    /// Fails if the settings leave nothing to sample from
    pub fn new(settings: BonusSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            bonuses: Vec::new(),
            frames_since_spawn: 0,
            next_id: 1,
        })
    }

    /// Active bonuses (sorted by id)
    pub fn bonuses(&self) -> &[Bonus] {
        &self.bonuses
    }

    pub fn active_count(&self) -> usize {
        self.bonuses.len()
    }

    pub fn frames_since_spawn(&self) -> u32 {
        self.frames_since_spawn
    }

    pub fn settings(&self) -> &BonusSettings {
        &self.settings
    }

    /// Collect touched bonuses, then maybe spawn one.
    /// Returns the summed value of everything collected.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        grid: &OccupancyGrid,
        layout: &GridLayout,
        ball_pos: Vec2,
        ball_radius: f32,
    ) -> f32 {
        self.frames_since_spawn = self.frames_since_spawn.saturating_add(1);

        let mut collected = 0.0;
        self.bonuses.retain(|bonus| {
            if bonus.touches(ball_pos, ball_radius) {
                log::debug!("Bonus {} collected (+{:.3})", bonus.id, bonus.value);
                collected += bonus.value;
                false
            } else {
                true
            }
        });

        if self.bonuses.len() < self.settings.max_active
            && self.frames_since_spawn > self.settings.min_spawn_delay
            && rng.random::<f32>() < self.settings.spawn_probability
        {
            self.try_spawn(rng, grid, layout, ball_pos);
        }

        collected
    }

    /// One bounded spawn attempt. Returns the new bonus id on success;
    /// exhausting the attempts defers the spawn to a later step.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        grid: &OccupancyGrid,
        layout: &GridLayout,
        ball_pos: Vec2,
    ) -> Option<u32> {
        if self.bonuses.len() >= self.settings.max_active || !(layout.cell_size > 0.0) {
            return None;
        }
        let min_sq = (layout.cell_size * self.settings.min_distance_cells).powi(2);
        let max_sq = (layout.cell_size * self.settings.max_distance_cells).powi(2);

        let spot = candidate_cells(rng, grid.rows(), grid.cols(), self.settings.max_attempts)
            .filter(|&cell| grid.is_passage(cell))
            .map(|cell| layout.cell_center(grid, cell))
            .find(|pos| {
                let d = pos.distance_squared(ball_pos);
                d > min_sq && d < max_sq
            })?;

        let value = rng.random_range(self.settings.value_min..self.settings.value_max);
        let id = self.next_id;
        self.next_id += 1;
        self.bonuses.push(Bonus {
            id,
            pos: spot,
            value,
            radius: layout.cell_size * self.settings.radius_cells,
            active: true,
        });
        self.frames_since_spawn = 0;
        log::debug!("Bonus {} spawned at {:?} (value {:.3})", id, spot, value);
        Some(id)
    }

    /// Apply `f` to every bonus position (maze rotation, viewport rescale)
    pub fn transform_positions(&mut self, mut f: impl FnMut(Vec2) -> Vec2) {
        for bonus in &mut self.bonuses {
            bonus.pos = f(bonus.pos);
        }
    }

    /// Deactivate and drop bonuses that no longer sit on a passage.
    /// Returns how many were dropped.
    pub fn drop_walled(&mut self, grid: &OccupancyGrid, layout: &GridLayout) -> usize {
        for bonus in &mut self.bonuses {
            if !layout.is_free(grid, bonus.pos) {
                bonus.active = false;
            }
        }
        let before = self.bonuses.len();
        self.bonuses.retain(|b| b.active);
        before - self.bonuses.len()
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    /// Rescale radii after the cell size changed
    pub fn set_cell_size(&mut self, cell_size: f32) {
        let radius = cell_size * self.settings.radius_cells;
        for bonus in &mut self.bonuses {
            bonus.radius = radius;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Cell;
    use crate::error::Error;
    use crate::sim::maze::generate_maze;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn eager() -> BonusSettings {
        BonusSettings {
            min_spawn_delay: 0,
            spawn_probability: 1.0,
            ..Default::default()
        }
    }

    fn open_field() -> (OccupancyGrid, GridLayout) {
        let grid = OccupancyGrid::filled(21, 21, Cell::Passage);
        let layout = GridLayout::fit(Vec2::splat(420.0), 21, 21);
        (grid, layout)
    }

    #[test]
    fn test_candidate_iterator_is_bounded() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(candidate_cells(&mut rng, 5, 5, 50).count(), 50);
        assert_eq!(candidate_cells(&mut rng, 0, 5, 50).count(), 0);
        assert!(candidate_cells(&mut rng, 3, 4, 20).all(|c| c.row < 3 && c.col < 4));
    }

    #[test]
    fn test_spawn_respects_cap_and_cooldown() {
        let (grid, layout) = open_field();
        let mut rng = Pcg32::seed_from_u64(2);
        let ball = layout.center();
        let mut spawner = BonusSpawner::new(BonusSettings {
            min_spawn_delay: 3,
            spawn_probability: 1.0,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..3 {
            spawner.update(&mut rng, &grid, &layout, ball, 1.0);
        }
        assert_eq!(spawner.active_count(), 0);
        spawner.update(&mut rng, &grid, &layout, ball, 1.0);
        assert_eq!(spawner.active_count(), 1);
        assert_eq!(spawner.frames_since_spawn(), 0);

        for _ in 0..100 {
            spawner.update(&mut rng, &grid, &layout, ball, 1.0);
        }
        assert_eq!(spawner.active_count(), spawner.settings().max_active);
    }

    #[test]
    fn test_collection_sums_and_removes() {
        let (grid, layout) = open_field();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut spawner = BonusSpawner::new(BonusSettings {
            max_active: 2,
            ..eager()
        })
        .unwrap();
        let ball = layout.center();
        spawner.update(&mut rng, &grid, &layout, ball, 1.0);
        spawner.update(&mut rng, &grid, &layout, ball, 1.0);
        assert_eq!(spawner.active_count(), 2);

        let target = spawner.bonuses()[0].clone();
        let collected = spawner.update(&mut rng, &grid, &layout, target.pos, 1.0);
        assert!(collected >= target.value);
        assert!(spawner.bonuses().iter().all(|b| b.id != target.id));
    }

    #[test]
    fn test_exhausted_attempts_defer_spawn() {
        // Only walls: every candidate is rejected
        let grid = OccupancyGrid::filled(9, 9, Cell::Wall);
        let layout = GridLayout::fit(Vec2::splat(90.0), 9, 9);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut spawner = BonusSpawner::new(eager()).unwrap();
        for _ in 0..10 {
            assert_eq!(spawner.update(&mut rng, &grid, &layout, layout.center(), 1.0), 0.0);
        }
        assert_eq!(spawner.active_count(), 0);
        assert_eq!(spawner.frames_since_spawn(), 10);
    }

    #[test]
    fn test_drop_walled() {
        let grid = OccupancyGrid::from_rows(&["#.", ".."]).unwrap();
        let layout = GridLayout::fit(Vec2::splat(20.0), 2, 2);
        let mut spawner = BonusSpawner::new(eager()).unwrap();
        for (id, cell) in [(1, GridPos::new(0, 0)), (2, GridPos::new(1, 1))] {
            spawner.bonuses.push(Bonus {
                id,
                pos: layout.cell_center(&grid, cell),
                value: 0.2,
                radius: 4.0,
                active: true,
            });
        }
        assert_eq!(spawner.drop_walled(&grid, &layout), 1);
        assert_eq!(spawner.bonuses().len(), 1);
        assert_eq!(spawner.bonuses()[0].id, 2);
    }

    #[test]
    fn test_unusable_settings_are_rejected() {
        let inverted = BonusSettings {
            value_min: 0.6,
            value_max: 0.1,
            ..Default::default()
        };
        assert!(matches!(BonusSpawner::new(inverted), Err(Error::InvalidConfig(_))));
        let empty = BonusSettings {
            value_min: 0.3,
            value_max: 0.3,
            ..Default::default()
        };
        assert!(BonusSpawner::new(empty).is_err());
        let unbounded = BonusSettings {
            value_max: f32::INFINITY,
            ..Default::default()
        };
        assert!(BonusSpawner::new(unbounded).is_err());
        assert!(BonusSpawner::new(BonusSettings::default()).is_ok());
    }

    proptest! {
        #[test]
        fn prop_spawned_bonus_respects_constraints(seed in any::<u64>(), row in 1usize..21, col in 1usize..21) {
            let grid = generate_maze(10, 10, seed).unwrap();
            let layout = GridLayout::fit(Vec2::new(800.0, 600.0), grid.rows(), grid.cols());
            let ball = layout.cell_center(&grid, GridPos::new(row, col));
            let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);
            let mut spawner = BonusSpawner::new(eager()).unwrap();
            let settings = spawner.settings().clone();
            let min_sq = (layout.cell_size * settings.min_distance_cells).powi(2);
            let max_sq = (layout.cell_size * settings.max_distance_cells).powi(2);

            for _ in 0..20 {
                if let Some(id) = spawner.try_spawn(&mut rng, &grid, &layout, ball) {
                    let bonus = spawner.bonuses().iter().find(|b| b.id == id).unwrap();
                    let cell = layout.cell_at(&grid, bonus.pos).unwrap();
                    prop_assert!(grid.is_passage(cell));
                    let d = bonus.pos.distance_squared(ball);
                    prop_assert!(d > min_sq && d < max_sq);
                    prop_assert!(bonus.value >= settings.value_min && bonus.value < settings.value_max);
                }
            }
            prop_assert!(spawner.active_count() <= settings.max_active);
        }
    }
}

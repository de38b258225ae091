//! The four precomputed maze configurations ("reality levels")
//!
//! Index 0 is the generated maze, each following index is one more quarter
//! turn clockwise. Grids are never mutated after construction.

use serde::{Deserialize, Serialize};

use super::grid::{OccupancyGrid, Turn};
use super::lucidity::LucidityBand;

/// Which configuration is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConfigState {
    #[default]
    Config0,
    Config1,
    Config2,
    Config3,
}

impl ConfigState {
    pub const ALL: [ConfigState; 4] = [
        ConfigState::Config0,
        ConfigState::Config1,
        ConfigState::Config2,
        ConfigState::Config3,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Configuration bound to a lucidity band
    pub fn for_band(band: LucidityBand) -> Self {
        match band {
            LucidityBand::Lucid => ConfigState::Config0,
            LucidityBand::Hazy => ConfigState::Config1,
            LucidityBand::Foggy => ConfigState::Config2,
            LucidityBand::Delirious => ConfigState::Config3,
        }
    }

    /// The configuration one quarter turn away
    pub fn turned(self, turn: Turn) -> Self {
        match turn {
            Turn::Clockwise => Self::from_index(self.index() + 1),
            Turn::CounterClockwise => Self::from_index(self.index() + 3),
        }
    }

    /// Quarter turns needed to reach `target`: none when equal, clockwise
    /// toward higher indices (fading lucidity), counter-clockwise otherwise
    pub fn path_to(self, target: Self) -> Option<(Turn, usize)> {
        let (from, to) = (self.index(), target.index());
        match from.cmp(&to) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => Some((Turn::Clockwise, to - from)),
            std::cmp::Ordering::Greater => Some((Turn::CounterClockwise, from - to)),
        }
    }
}

/// Owned arena of the four rotated grids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeConfigurationSet {
    grids: [OccupancyGrid; 4],
}

impl MazeConfigurationSet {
    pub fn new(canonical: OccupancyGrid) -> Self {
        Self {
            grids: derive_rotations(&canonical),
        }
    }

    pub fn get(&self, state: ConfigState) -> &OccupancyGrid {
        &self.grids[state.index()]
    }

    pub fn canonical(&self) -> &OccupancyGrid {
        &self.grids[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConfigState, &OccupancyGrid)> {
        ConfigState::ALL.into_iter().zip(self.grids.iter())
    }
}

/// Canonical grid plus its 90, 180 and 270 degree clockwise rotations
pub fn derive_rotations(grid: &OccupancyGrid) -> [OccupancyGrid; 4] {
    [
        grid.clone(),
        grid.rotated_cw(1),
        grid.rotated_cw(2),
        grid.rotated_cw(3),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::GridPos;
    use crate::sim::maze::generate_maze;

    #[test]
    fn test_each_config_is_previous_turned_clockwise() {
        let set = MazeConfigurationSet::new(generate_maze(4, 3, 5).unwrap());
        for state in ConfigState::ALL {
            let next = state.turned(Turn::Clockwise);
            assert_eq!(&set.get(state).turned(Turn::Clockwise), set.get(next));
        }
        assert_eq!(set.get(ConfigState::Config1).rows(), set.canonical().cols());
    }

    #[test]
    fn test_turned_cycles() {
        let mut state = ConfigState::Config0;
        for _ in 0..4 {
            state = state.turned(Turn::Clockwise);
        }
        assert_eq!(state, ConfigState::Config0);
        assert_eq!(ConfigState::Config0.turned(Turn::CounterClockwise), ConfigState::Config3);
        assert_eq!(
            ConfigState::Config2.turned(Turn::Clockwise).turned(Turn::CounterClockwise),
            ConfigState::Config2
        );
    }

    #[test]
    fn test_path_to() {
        use ConfigState::*;
        assert_eq!(Config0.path_to(Config0), None);
        assert_eq!(Config0.path_to(Config3), Some((Turn::Clockwise, 3)));
        assert_eq!(Config3.path_to(Config1), Some((Turn::CounterClockwise, 2)));
        for from in ConfigState::ALL {
            for to in ConfigState::ALL {
                let mut state = from;
                if let Some((turn, steps)) = from.path_to(to) {
                    for _ in 0..steps {
                        state = state.turned(turn);
                    }
                }
                assert_eq!(state, to);
            }
        }
    }

    #[test]
    fn test_every_config_has_passages() {
        let set = MazeConfigurationSet::new(generate_maze(3, 3, 1).unwrap());
        for (_, grid) in set.iter() {
            assert!(grid.first_passage().is_some());
            assert!(grid.is_wall(GridPos::new(0, 0)));
        }
    }
}

use crate::deadlocks::{Axis, DeadSpot, DeadSpots};
use crate::grid::{Extent, OccupancyGrid, Position};
use log::debug;
use std::collections::BTreeSet;
use thiserror::Error;

pub const MAX_BOXES: usize = 64;

/// Reasons a layout, state, or puzzle cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("grid has no cells")]
    EmptyGrid,
    #[error("no targets given")]
    NoTargets,
    #[error("target {0} is out of range")]
    TargetOutOfRange(Position),
    #[error("target {0} is under a wall")]
    TargetUnderWall(Position),
    #[error("player {0} is out of range")]
    PlayerOutOfRange(Position),
    #[error("player {0} is on a wall")]
    PlayerOnWall(Position),
    #[error("player {0} is on a box")]
    PlayerOnBox(Position),
    #[error("box {0} is out of range")]
    BoxOutOfRange(Position),
    #[error("box {0} is on a wall")]
    BoxOnWall(Position),
    #[error("box count ({boxes}) does not match target count ({targets})")]
    BoxTargetMismatch { boxes: usize, targets: usize },
    #[error("{0} boxes exceeds the maximum of {max}", max = MAX_BOXES)]
    TooManyBoxes(usize),
    #[error("empty board")]
    EmptyBoard,
    #[error("no player found on board")]
    NoPlayer,
    #[error("multiple players found")]
    MultiplePlayers,
    #[error("invalid character '{ch}' at row {row}, column {col}")]
    InvalidCharacter { ch: char, row: usize, col: usize },
}

/// The fixed part of a puzzle: walls, targets, and what can be derived
/// from them once.
#[derive(Debug, Clone)]
pub struct Layout {
    walls: OccupancyGrid,
    targets: BTreeSet<Position>,
    accessible: OccupancyGrid,
    dead_spots: DeadSpots,
}

impl Layout {
    /// Build a layout. `start` is the player's starting cell, from which the
    /// walkable region (ignoring boxes) is derived. Cells outside `walls`
    /// count as walls.
    pub fn new(
        walls: &OccupancyGrid,
        targets: BTreeSet<Position>,
        start: Position,
    ) -> Result<Self, CreateError> {
        let extent = walls.extent();
        if extent.is_empty() {
            return Err(CreateError::EmptyGrid);
        }

        let mut bounded = OccupancyGrid::new(extent, true);
        for pos in extent {
            bounded.set(pos, walls.get(pos));
        }
        let walls = bounded;

        if targets.is_empty() {
            return Err(CreateError::NoTargets);
        }
        for &target in &targets {
            if !extent.contains(target) {
                return Err(CreateError::TargetOutOfRange(target));
            }
            if walls.get(target) {
                return Err(CreateError::TargetUnderWall(target));
            }
        }

        if !extent.contains(start) {
            return Err(CreateError::PlayerOutOfRange(start));
        }
        if walls.get(start) {
            return Err(CreateError::PlayerOnWall(start));
        }

        let accessible = OccupancyGrid::flood_fill(extent, start, |pos| !walls.get(pos));
        let dead_spots = DeadSpots::new(&walls, &targets);

        for axis in [Axis::Horizontal, Axis::Vertical] {
            for spot in dead_spots.spots(axis) {
                debug!(
                    "{:?} dead spot with {} target(s): {:?}",
                    axis,
                    spot.targets(),
                    spot.cells()
                );
            }
        }

        Ok(Layout {
            walls,
            targets,
            accessible,
            dead_spots,
        })
    }

    pub fn extent(&self) -> Extent {
        self.walls.extent()
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.walls.get(pos)
    }

    pub fn walls(&self) -> &OccupancyGrid {
        &self.walls
    }

    pub fn targets(&self) -> &BTreeSet<Position> {
        &self.targets
    }

    pub fn is_target(&self, pos: Position) -> bool {
        self.targets.contains(&pos)
    }

    /// Cells reachable from the starting cell when no boxes are present.
    pub fn accessible(&self) -> &OccupancyGrid {
        &self.accessible
    }

    pub fn dead_spots(&self) -> &DeadSpots {
        &self.dead_spots
    }

    pub fn horizontal_dead(&self, pos: Position) -> Option<&DeadSpot> {
        self.dead_spots.find(Axis::Horizontal, pos)
    }

    pub fn vertical_dead(&self, pos: Position) -> Option<&DeadSpot> {
        self.dead_spots.find(Axis::Vertical, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> OccupancyGrid {
        let extent = Extent::new(4, 5);
        let mut walls = OccupancyGrid::new(extent, false);
        for pos in extent {
            let border = pos.row == 0 || pos.col == 0 || pos.row == 3 || pos.col == 4;
            walls.set(pos, border);
        }
        walls
    }

    fn targets(list: &[(i32, i32)]) -> BTreeSet<Position> {
        list.iter().map(|&(r, c)| Position::new(r, c)).collect()
    }

    #[test]
    fn test_new() {
        let layout = Layout::new(&room(), targets(&[(1, 2)]), Position::new(2, 2)).unwrap();
        assert_eq!(layout.extent(), Extent::new(4, 5));
        assert!(layout.is_target(Position::new(1, 2)));
        assert!(layout.is_wall(Position::new(0, 0)));
        assert!(layout.is_wall(Position::new(-1, 2)));
        assert!(layout.is_wall(Position::new(2, 9)));
        assert_eq!(layout.accessible().count(), 6);
        assert!(layout.horizontal_dead(Position::new(1, 2)).is_some());
        assert!(layout.vertical_dead(Position::new(1, 2)).is_none());
    }

    #[test]
    fn test_accessible_ignores_other_rooms() {
        let mut walls = room();
        walls.set(Position::new(1, 2), true);
        walls.set(Position::new(2, 2), true);
        let layout = Layout::new(&walls, targets(&[(1, 1)]), Position::new(1, 1)).unwrap();
        assert!(layout.accessible().get(Position::new(2, 1)));
        assert!(!layout.accessible().get(Position::new(1, 3)));
    }

    #[test]
    fn test_errors() {
        let empty = OccupancyGrid::new(Extent::new(0, 3), false);
        assert_eq!(
            Layout::new(&empty, targets(&[(0, 0)]), Position::new(0, 0)).unwrap_err(),
            CreateError::EmptyGrid
        );
        assert_eq!(
            Layout::new(&room(), BTreeSet::new(), Position::new(1, 1)).unwrap_err(),
            CreateError::NoTargets
        );
        assert_eq!(
            Layout::new(&room(), targets(&[(5, 1)]), Position::new(1, 1)).unwrap_err(),
            CreateError::TargetOutOfRange(Position::new(5, 1))
        );
        assert_eq!(
            Layout::new(&room(), targets(&[(0, 1)]), Position::new(1, 1)).unwrap_err(),
            CreateError::TargetUnderWall(Position::new(0, 1))
        );
        assert_eq!(
            Layout::new(&room(), targets(&[(1, 1)]), Position::new(0, 0)).unwrap_err(),
            CreateError::PlayerOnWall(Position::new(0, 0))
        );
        assert_eq!(
            Layout::new(&room(), targets(&[(1, 1)]), Position::new(-1, 0)).unwrap_err(),
            CreateError::PlayerOutOfRange(Position::new(-1, 0))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CreateError::TargetUnderWall(Position::new(0, 1)).to_string(),
            "target (0, 1) is under a wall"
        );
        assert_eq!(
            CreateError::BoxTargetMismatch { boxes: 2, targets: 1 }.to_string(),
            "box count (2) does not match target count (1)"
        );
    }
}

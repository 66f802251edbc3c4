use crate::grid::{ALL_DIRECTIONS, Direction, OccupancyGrid, Position};
use crate::layout::{CreateError, Layout};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Push the box at `from` one cell in `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Push {
    pub from: Position,
    pub direction: Direction,
}

impl Push {
    pub fn new(from: Position, direction: Direction) -> Self {
        Push { from, direction }
    }

    /// Where the box ends up.
    pub fn to(&self) -> Position {
        self.from.adjacent(self.direction)
    }

    /// Where the player must stand to make the push.
    pub fn stand(&self) -> Position {
        self.from.adjacent(self.direction.opposite())
    }
}

impl fmt::Display for Push {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.direction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("no box at {0}")]
    NoBox(Position),
    #[error("cannot push box at {from} {direction}: destination blocked")]
    Blocked { from: Position, direction: Direction },
    #[error("cannot step {0}: blocked")]
    StepBlocked(Direction),
    #[error("{0} is not reachable")]
    Unreachable(Position),
    #[error(transparent)]
    Invalid(#[from] CreateError),
}

/// Box and player positions at one point in a game. The player's reachable
/// region is computed on construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleState {
    boxes: BTreeSet<Position>,
    player: Position,
    reachable: OccupancyGrid,
}

impl PuzzleState {
    pub fn new(layout: &Layout, boxes: BTreeSet<Position>, player: Position) -> Result<Self, CreateError> {
        let extent = layout.extent();
        for &pos in &boxes {
            if !extent.contains(pos) {
                return Err(CreateError::BoxOutOfRange(pos));
            }
            if layout.is_wall(pos) {
                return Err(CreateError::BoxOnWall(pos));
            }
        }
        if !extent.contains(player) {
            return Err(CreateError::PlayerOutOfRange(player));
        }
        if layout.is_wall(player) {
            return Err(CreateError::PlayerOnWall(player));
        }
        if boxes.contains(&player) {
            return Err(CreateError::PlayerOnBox(player));
        }

        let reachable = OccupancyGrid::flood_fill(extent, player, |pos| {
            !layout.is_wall(pos) && !boxes.contains(&pos)
        });

        Ok(PuzzleState {
            boxes,
            player,
            reachable,
        })
    }

    /// Box positions in row-major order.
    pub fn boxes(&self) -> &BTreeSet<Position> {
        &self.boxes
    }

    pub fn has_box(&self, pos: Position) -> bool {
        self.boxes.contains(&pos)
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn reachable(&self) -> &OccupancyGrid {
        &self.reachable
    }

    pub fn is_reachable(&self, pos: Position) -> bool {
        self.reachable.get(pos)
    }

    /// The first reachable cell in row-major order; identical for every
    /// player position within the same region.
    pub fn canonical_player(&self) -> Position {
        self.reachable.first_set().unwrap_or(self.player)
    }

    /// Every target is covered by a box.
    pub fn is_goal(&self, layout: &Layout) -> bool {
        layout.targets().is_subset(&self.boxes)
    }

    /// Whether the box at `pos` can never reach a target from here.
    ///
    /// A box in a dead spot on both axes is stuck for good, so it is only
    /// fine if it already sits on a target. A box in a dead spot on one axis
    /// is stuck once that spot holds more boxes than targets.
    pub fn is_terminal(&self, layout: &Layout, pos: Position) -> bool {
        match (layout.horizontal_dead(pos), layout.vertical_dead(pos)) {
            (None, None) => false,
            (Some(_), Some(_)) => !layout.is_target(pos),
            (Some(spot), None) | (None, Some(spot)) => spot.count_boxes(&self.boxes) > spot.targets(),
        }
    }

    /// Whether a box could be pushed from `from` towards `direction`.
    pub fn can_push(&self, layout: &Layout, push: Push) -> bool {
        let to = push.to();
        self.has_box(push.from) && self.is_reachable(push.stand()) && !layout.is_wall(to) && !self.has_box(to)
    }

    /// All pushes the player can make without walking through boxes.
    pub fn legal_pushes(&self, layout: &Layout) -> Vec<Push> {
        let mut pushes = Vec::new();
        for &from in &self.boxes {
            for dir in ALL_DIRECTIONS {
                let push = Push::new(from, dir);
                if self.can_push(layout, push) {
                    pushes.push(push);
                }
            }
        }
        pushes
    }

    /// The state after `push`. The player ends up where the box was.
    /// Player reachability is not checked.
    pub fn apply_push(&self, layout: &Layout, push: Push) -> Result<PuzzleState, IllegalMove> {
        if !self.has_box(push.from) {
            return Err(IllegalMove::NoBox(push.from));
        }
        let to = push.to();
        if layout.is_wall(to) || self.has_box(to) {
            return Err(IllegalMove::Blocked {
                from: push.from,
                direction: push.direction,
            });
        }

        let mut boxes = self.boxes.clone();
        boxes.remove(&push.from);
        boxes.insert(to);
        Ok(PuzzleState::new(layout, boxes, push.from)?)
    }
}

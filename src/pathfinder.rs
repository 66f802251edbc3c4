use crate::grid::{ALL_DIRECTIONS, Direction, Extent, OccupancyGrid, Position};
use crate::search::{AStar, Admission, SearchConfig, SearchOutcome, SearchProblem};
use arrayvec::ArrayVec;
use std::cmp::Ordering;

/// Shortest walk between two cells of a walkable grid, one unit per step.
#[derive(Debug, Clone)]
pub struct PathProblem<'a> {
    walkable: &'a OccupancyGrid,
    start: Position,
    finish: Position,
}

impl<'a> PathProblem<'a> {
    pub fn new(walkable: &'a OccupancyGrid, start: Position, finish: Position) -> Self {
        PathProblem {
            walkable,
            start,
            finish,
        }
    }
}

impl SearchProblem for PathProblem<'_> {
    type State = Position;
    type Move = Direction;
    type Moves = ArrayVec<Direction, 4>;

    fn initial(&self) -> Position {
        self.start
    }

    fn transitions(&self, state: &Position) -> Self::Moves {
        ALL_DIRECTIONS
            .into_iter()
            .filter(|&dir| self.walkable.get(state.adjacent(dir)))
            .collect()
    }

    fn apply(&self, move_: &Direction, state: &Position) -> Option<Position> {
        Some(state.adjacent(*move_))
    }

    fn heuristic(&self, state: &Position) -> usize {
        state.manhattan(self.finish)
    }

    fn is_goal(&self, state: &Position) -> bool {
        *state == self.finish
    }

    fn cost(&self, _move: &Direction) -> usize {
        1
    }

    fn compare(&self, a: &Position, b: &Position) -> Ordering {
        a.cmp(b)
    }
}

/// Shortest route for a single box over `floor`, other boxes ignored. A box
/// moves one cell when both the cell ahead and the cell behind it, where
/// the player stands, are floor.
#[derive(Debug, Clone)]
pub struct BoxPathProblem<'a> {
    floor: &'a OccupancyGrid,
    start: Position,
    finish: Position,
}

impl<'a> BoxPathProblem<'a> {
    pub fn new(floor: &'a OccupancyGrid, start: Position, finish: Position) -> Self {
        BoxPathProblem { floor, start, finish }
    }
}

impl SearchProblem for BoxPathProblem<'_> {
    type State = Position;
    type Move = Direction;
    type Moves = ArrayVec<Direction, 4>;

    fn initial(&self) -> Position {
        self.start
    }

    fn transitions(&self, state: &Position) -> Self::Moves {
        ALL_DIRECTIONS
            .into_iter()
            .filter(|&dir| {
                self.floor.get(state.adjacent(dir)) && self.floor.get(state.adjacent(dir.opposite()))
            })
            .collect()
    }

    fn apply(&self, move_: &Direction, state: &Position) -> Option<Position> {
        Some(state.adjacent(*move_))
    }

    fn heuristic(&self, state: &Position) -> usize {
        state.manhattan(self.finish)
    }

    fn is_goal(&self, state: &Position) -> bool {
        *state == self.finish
    }

    fn cost(&self, _move: &Direction) -> usize {
        1
    }

    fn compare(&self, a: &Position, b: &Position) -> Ordering {
        a.cmp(b)
    }
}

/// Admits a cell only when it is reached more cheaply than ever before.
/// Every cell is then queued at most once per neighbour, which keeps grid
/// searches polynomial while preserving shortest paths.
#[derive(Debug, Clone)]
pub struct CheapestArrival {
    extent: Extent,
    best: Vec<usize>,
}

impl CheapestArrival {
    pub fn new(extent: Extent) -> Self {
        CheapestArrival {
            extent,
            best: vec![usize::MAX; extent.area()],
        }
    }
}

impl<M> Admission<Position, M> for CheapestArrival {
    fn admit(&mut self, pos: &Position, _move: Option<&M>, cost: usize) -> bool {
        if !self.extent.contains(*pos) {
            // Only a start cell can lie off the grid; it is never reached again.
            return true;
        }
        let idx = pos.row as usize * self.extent.cols as usize + pos.col as usize;
        if cost < self.best[idx] {
            self.best[idx] = cost;
            true
        } else {
            false
        }
    }
}

fn shortest<P>(problem: P, extent: Extent) -> Option<Vec<Direction>>
where
    P: SearchProblem<State = Position, Move = Direction>,
{
    let mut search = AStar::with_admission(problem, CheapestArrival::new(extent), SearchConfig::default());
    match search.solve_and_wait() {
        SearchOutcome::Solved(moves) => Some(moves),
        _ => None,
    }
}

/// Directions leading from `start` to `finish` through walkable cells, or
/// `None` if `finish` cannot be reached.
pub fn find_path(walkable: &OccupancyGrid, start: Position, finish: Position) -> Option<Vec<Direction>> {
    shortest(PathProblem::new(walkable, start, finish), walkable.extent())
}

/// Directions a lone box at `start` must be pushed to reach `finish`, or
/// `None` if it never can.
pub fn find_box_path(floor: &OccupancyGrid, start: Position, finish: Position) -> Option<Vec<Direction>> {
    shortest(BoxPathProblem::new(floor, start, finish), floor.extent())
}

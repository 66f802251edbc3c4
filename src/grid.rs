use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// (row, col) offset of one step in this direction.
    fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::North => write!(f, "North"),
            Direction::East => write!(f, "East"),
            Direction::South => write!(f, "South"),
            Direction::West => write!(f, "West"),
        }
    }
}

/// A grid coordinate. Ordering is row-major.
///
/// Coordinates are signed so that neighbours of border cells can be named;
/// anything outside an [`Extent`] is simply out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    pub fn adjacent(&self, dir: Direction) -> Position {
        let (dr, dc) = dir.delta();
        Position::new(self.row + dr, self.col + dc)
    }

    pub fn manhattan(&self, other: Position) -> usize {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Size of a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    pub rows: i32,
    pub cols: i32,
}

impl Extent {
    pub const fn new(rows: i32, cols: i32) -> Self {
        Extent { rows, cols }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows <= 0 || self.cols <= 0
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.rows as usize * self.cols as usize
        }
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> Positions {
        Positions {
            extent: *self,
            next: 0,
        }
    }
}

impl IntoIterator for Extent {
    type Item = Position;
    type IntoIter = Positions;

    fn into_iter(self) -> Self::IntoIter {
        self.positions()
    }
}

#[derive(Debug, Clone)]
pub struct Positions {
    extent: Extent,
    next: usize,
}

impl Iterator for Positions {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.extent.area() {
            return None;
        }
        let cols = self.extent.cols as usize;
        let pos = Position::new((self.next / cols) as i32, (self.next % cols) as i32);
        self.next += 1;
        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.extent.area().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Positions {}

/// Dense boolean grid. Reads outside the extent return the grid's default
/// value and writes outside it are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccupancyGrid {
    extent: Extent,
    default: bool,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(extent: Extent, default: bool) -> Self {
        OccupancyGrid {
            extent,
            default,
            cells: vec![default; extent.area()],
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    fn offset(&self, pos: Position) -> Option<usize> {
        if self.extent.contains(pos) {
            Some(pos.row as usize * self.extent.cols as usize + pos.col as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> bool {
        match self.offset(pos) {
            Some(idx) => self.cells[idx],
            None => self.default,
        }
    }

    pub fn set(&mut self, pos: Position, value: bool) {
        if let Some(idx) = self.offset(pos) {
            self.cells[idx] = value;
        }
    }

    /// Number of in-bounds cells set to true.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// First in-bounds position (row-major) set to true.
    pub fn first_set(&self) -> Option<Position> {
        self.extent.positions().find(|&pos| self.get(pos))
    }

    /// Flood fill from `start` over cells for which `open` holds, marking
    /// every visited cell. Returns a grid with default `false`.
    pub fn flood_fill(extent: Extent, start: Position, open: impl Fn(Position) -> bool) -> Self {
        let mut reached = OccupancyGrid::new(extent, false);
        if !extent.contains(start) || !open(start) {
            return reached;
        }

        let mut stack = vec![start];
        reached.set(start, true);

        while let Some(pos) = stack.pop() {
            for dir in ALL_DIRECTIONS {
                let next = pos.adjacent(dir);
                if extent.contains(next) && !reached.get(next) && open(next) {
                    reached.set(next, true);
                    stack.push(next);
                }
            }
        }

        reached
    }
}

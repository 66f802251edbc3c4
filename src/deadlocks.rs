use crate::grid::{Direction, OccupancyGrid, Position};
use std::collections::{BTreeMap, BTreeSet};

/// A maximal run of floor cells along one axis, bounded by walls at both
/// ends, where every cell touches a wall across that axis. A box inside the
/// run can never leave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadSpot {
    cells: BTreeSet<Position>,
    targets: usize,
}

impl DeadSpot {
    fn new(cells: BTreeSet<Position>, targets: &BTreeSet<Position>) -> Self {
        let targets = cells.intersection(targets).count();
        DeadSpot { cells, targets }
    }

    pub fn cells(&self) -> &BTreeSet<Position> {
        &self.cells
    }

    /// Number of targets inside the run.
    pub fn targets(&self) -> usize {
        self.targets
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    pub fn count_boxes(&self, boxes: &BTreeSet<Position>) -> usize {
        self.cells.intersection(boxes).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Runs along a row, touching walls to the north or south.
    Horizontal,
    /// Runs along a column, touching walls to the east or west.
    Vertical,
}

#[derive(Debug, Clone, Default)]
struct AxisSpots {
    spots: Vec<DeadSpot>,
    index: BTreeMap<Position, usize>,
}

impl AxisSpots {
    fn new(spots: Vec<DeadSpot>) -> Self {
        let index = spots
            .iter()
            .enumerate()
            .flat_map(|(idx, spot)| spot.cells.iter().map(move |&pos| (pos, idx)))
            .collect();
        AxisSpots { spots, index }
    }

    fn get(&self, pos: Position) -> Option<&DeadSpot> {
        self.index.get(&pos).map(|&idx| &self.spots[idx])
    }
}

/// Dead spots along both axes, computed once per layout.
#[derive(Debug, Clone)]
pub struct DeadSpots {
    horizontal: AxisSpots,
    vertical: AxisSpots,
}

impl DeadSpots {
    /// `walls` must report out-of-bounds cells as walls.
    pub fn new(walls: &OccupancyGrid, targets: &BTreeSet<Position>) -> Self {
        DeadSpots {
            horizontal: AxisSpots::new(Self::scan(walls, targets, Axis::Horizontal)),
            vertical: AxisSpots::new(Self::scan(walls, targets, Axis::Vertical)),
        }
    }

    pub fn spots(&self, axis: Axis) -> &[DeadSpot] {
        match axis {
            Axis::Horizontal => &self.horizontal.spots,
            Axis::Vertical => &self.vertical.spots,
        }
    }

    /// The dead spot along `axis` containing `pos`, if any.
    pub fn find(&self, axis: Axis, pos: Position) -> Option<&DeadSpot> {
        match axis {
            Axis::Horizontal => self.horizontal.get(pos),
            Axis::Vertical => self.vertical.get(pos),
        }
    }

    /// Scan every line of the grid, including one line of wall beyond each
    /// border. A run is only kept if it is closed by a wall; any floor cell
    /// without a wall on either side poisons the run until the next wall.
    fn scan(walls: &OccupancyGrid, targets: &BTreeSet<Position>, axis: Axis) -> Vec<DeadSpot> {
        let extent = walls.extent();
        let (lines, cells, sides) = match axis {
            Axis::Horizontal => (extent.rows, extent.cols, [Direction::North, Direction::South]),
            Axis::Vertical => (extent.cols, extent.rows, [Direction::East, Direction::West]),
        };

        let mut spots = Vec::new();
        let mut run: Option<BTreeSet<Position>> = Some(BTreeSet::new());

        for line in -1..=lines {
            for cell in -1..=cells {
                let here = match axis {
                    Axis::Horizontal => Position::new(line, cell),
                    Axis::Vertical => Position::new(cell, line),
                };

                if walls.get(here) {
                    if let Some(cells) = run.take() {
                        if !cells.is_empty() {
                            spots.push(DeadSpot::new(cells, targets));
                        }
                    }
                    run = Some(BTreeSet::new());
                } else if sides.iter().any(|&side| walls.get(here.adjacent(side))) {
                    if let Some(cells) = run.as_mut() {
                        cells.insert(here);
                    }
                } else {
                    run = None;
                }
            }
        }

        spots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Extent;

    fn walls(rows: &[&str]) -> (OccupancyGrid, BTreeSet<Position>) {
        let extent = Extent::new(rows.len() as i32, rows[0].len() as i32);
        let mut walls = OccupancyGrid::new(extent, true);
        let mut targets = BTreeSet::new();
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                let pos = Position::new(r as i32, c as i32);
                walls.set(pos, ch == '#');
                if ch == '.' {
                    targets.insert(pos);
                }
            }
        }
        (walls, targets)
    }

    fn cells(spot: &DeadSpot) -> Vec<(i32, i32)> {
        spot.cells().iter().map(|p| (p.row, p.col)).collect()
    }

    #[test]
    fn test_room_edges() {
        let (walls, targets) = walls(&[
            "#####", //
            "#.  #",
            "#   #",
            "#   #",
            "#####",
        ]);
        let spots = DeadSpots::new(&walls, &targets);

        let horizontal: Vec<_> = spots.spots(Axis::Horizontal).iter().map(cells).collect();
        assert_eq!(
            horizontal,
            vec![vec![(1, 1), (1, 2), (1, 3)], vec![(3, 1), (3, 2), (3, 3)]]
        );
        let vertical: Vec<_> = spots.spots(Axis::Vertical).iter().map(cells).collect();
        assert_eq!(
            vertical,
            vec![vec![(1, 1), (2, 1), (3, 1)], vec![(1, 3), (2, 3), (3, 3)]]
        );

        assert_eq!(spots.spots(Axis::Horizontal)[0].targets(), 1);
        assert_eq!(spots.spots(Axis::Horizontal)[1].targets(), 0);
        assert!(spots.find(Axis::Horizontal, Position::new(2, 2)).is_none());
        assert!(spots.find(Axis::Vertical, Position::new(2, 2)).is_none());
        assert_eq!(
            spots.find(Axis::Vertical, Position::new(2, 3)).map(|s| s.targets()),
            Some(0)
        );
    }

    #[test]
    fn test_open_side_breaks_run() {
        // The top row's run is poisoned by (1,4), which has floor above and below.
        let (walls, targets) = walls(&[
            "#### ##", //
            "#     #",
            "#  #  #",
            "#######",
        ]);
        let spots = DeadSpots::new(&walls, &targets);

        assert!(spots.find(Axis::Horizontal, Position::new(1, 1)).is_none());
        assert!(spots.find(Axis::Horizontal, Position::new(1, 5)).is_none());

        // Bottom floor row is split by the wall at (2,3).
        let left = spots.find(Axis::Horizontal, Position::new(2, 1)).unwrap();
        assert_eq!(cells(left), vec![(2, 1), (2, 2)]);
        let right = spots.find(Axis::Horizontal, Position::new(2, 5)).unwrap();
        assert_eq!(cells(right), vec![(2, 4), (2, 5)]);
    }

    #[test]
    fn test_count_boxes() {
        let (walls, targets) = walls(&[
            "#####", //
            "#. .#",
            "#   #",
            "#####",
        ]);
        let spots = DeadSpots::new(&walls, &targets);
        let top = spots.find(Axis::Horizontal, Position::new(1, 2)).unwrap();
        assert_eq!(top.targets(), 2);

        let boxes: BTreeSet<Position> = [Position::new(1, 2), Position::new(1, 3), Position::new(2, 2)]
            .into_iter()
            .collect();
        assert_eq!(top.count_boxes(&boxes), 2);
    }

    #[test]
    fn test_spots_disjoint_per_axis() {
        let (walls, targets) = walls(&[
            "########", //
            "#   #  #",
            "# #    #",
            "#   ## #",
            "########",
        ]);
        let spots = DeadSpots::new(&walls, &targets);
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let mut seen = BTreeSet::new();
            for spot in spots.spots(axis) {
                for &pos in spot.cells() {
                    assert!(seen.insert(pos), "{} in two {:?} spots", pos, axis);
                    assert!(!walls.get(pos));
                }
            }
        }
    }
}

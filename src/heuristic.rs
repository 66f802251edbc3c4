use crate::grid::{Direction, OccupancyGrid, Position};
use crate::hungarian::{ArrayMatrix, min_cost_assignment};
use crate::layout::{Layout, MAX_BOXES};
use crate::pathfinder::{find_box_path, find_path};
use crate::state::PuzzleState;
use clap::ValueEnum;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Estimates the number of pushes still needed to solve a state.
pub trait Heuristic: Send {
    fn estimate(&self, state: &PuzzleState) -> usize;
}

impl<H: Heuristic + ?Sized> Heuristic for Box<H> {
    fn estimate(&self, state: &PuzzleState) -> usize {
        (**self).estimate(state)
    }
}

/// Selects one of the built-in heuristics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeuristicKind {
    /// Always zero.
    Null,
    /// Each box to its nearest target.
    Nearest,
    /// Sorted rows and columns of boxes against those of targets.
    ShiftSum,
    /// Farthest-first greedy pairing of boxes with targets.
    Paired,
    /// Farthest-first greedy pairing of targets with boxes.
    ReversePaired,
    /// Minimum-cost pairing of boxes with targets.
    #[default]
    Hungarian,
}

impl HeuristicKind {
    /// Build the heuristic, measuring box-to-target separation with
    /// `distance`. `Null` and `ShiftSum` ignore it.
    pub fn build(self, layout: &Arc<Layout>, distance: Distance) -> Box<dyn Heuristic> {
        let layout = Arc::clone(layout);
        match self {
            HeuristicKind::Null => Box::new(NullHeuristic),
            HeuristicKind::Nearest => Box::new(NearestHeuristic::new(Metric::new(layout, distance))),
            HeuristicKind::ShiftSum => Box::new(ShiftSumHeuristic::new(layout)),
            HeuristicKind::Paired => Box::new(PairedHeuristic::new(Metric::new(layout, distance), false)),
            HeuristicKind::ReversePaired => {
                Box::new(PairedHeuristic::new(Metric::new(layout, distance), true))
            }
            HeuristicKind::Hungarian => Box::new(HungarianHeuristic::new(Metric::new(layout, distance))),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => write!(f, "{}", value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

/// How the separation between a box and a target is measured. Each is a
/// lower bound on the pushes needed to bring the box there alone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Distance {
    /// Grid distance, ignoring walls.
    Manhattan,
    /// Player walking distance over the open floor.
    Path,
    /// Pushes needed to move the box there with no other boxes around.
    #[default]
    BoxPath,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => write!(f, "{}", value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

type Route = fn(&OccupancyGrid, Position, Position) -> Option<Vec<Direction>>;

/// Box-to-target distances over a layout's accessible floor. Routed
/// distances fall back to Manhattan distance where no route exists and are
/// memoized per (box, target) pair.
#[derive(Debug)]
pub struct Metric {
    layout: Arc<Layout>,
    distance: Distance,
    cache: RefCell<HashMap<(Position, Position), usize>>,
}

impl Metric {
    pub fn new(layout: Arc<Layout>, distance: Distance) -> Self {
        Metric {
            layout,
            distance,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Distance from a box at `from` to a target at `to`.
    pub fn between(&self, from: Position, to: Position) -> usize {
        let route: Route = match self.distance {
            Distance::Manhattan => return from.manhattan(to),
            Distance::Path => find_path,
            Distance::BoxPath => find_box_path,
        };

        if let Some(&dist) = self.cache.borrow().get(&(from, to)) {
            return dist;
        }
        let dist = route(self.layout.accessible(), from, to)
            .map(|path| path.len())
            .unwrap_or_else(|| from.manhattan(to));
        self.cache.borrow_mut().insert((from, to), dist);
        dist
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullHeuristic;

impl Heuristic for NullHeuristic {
    fn estimate(&self, _state: &PuzzleState) -> usize {
        0
    }
}

/// Sum over boxes of the distance to the nearest target.
pub fn nearest_sum(
    boxes: &BTreeSet<Position>,
    targets: &BTreeSet<Position>,
    dist: impl Fn(Position, Position) -> usize,
) -> usize {
    boxes
        .iter()
        .map(|&b| targets.iter().map(|&t| dist(b, t)).min().unwrap_or(0))
        .sum()
}

#[derive(Debug)]
pub struct NearestHeuristic {
    metric: Metric,
}

impl NearestHeuristic {
    pub fn new(metric: Metric) -> Self {
        NearestHeuristic { metric }
    }
}

impl Heuristic for NearestHeuristic {
    fn estimate(&self, state: &PuzzleState) -> usize {
        nearest_sum(state.boxes(), self.metric.layout().targets(), |b, t| {
            self.metric.between(b, t)
        })
    }
}

/// Lower bound from each axis separately: pair the i-th smallest box
/// coordinate with the i-th smallest target coordinate.
pub fn shift_sum(boxes: &BTreeSet<Position>, targets: &BTreeSet<Position>) -> usize {
    fn axis(boxes: &BTreeSet<Position>, targets: &BTreeSet<Position>, key: fn(&Position) -> i32) -> usize {
        let mut from: Vec<i32> = boxes.iter().map(key).collect();
        let mut to: Vec<i32> = targets.iter().map(key).collect();
        from.sort_unstable();
        to.sort_unstable();
        from.iter().zip(&to).map(|(a, b)| a.abs_diff(*b) as usize).sum()
    }
    axis(boxes, targets, |p| p.row) + axis(boxes, targets, |p| p.col)
}

#[derive(Debug, Clone)]
pub struct ShiftSumHeuristic {
    layout: Arc<Layout>,
}

impl ShiftSumHeuristic {
    pub fn new(layout: Arc<Layout>) -> Self {
        ShiftSumHeuristic { layout }
    }
}

impl Heuristic for ShiftSumHeuristic {
    fn estimate(&self, state: &PuzzleState) -> usize {
        shift_sum(state.boxes(), self.layout.targets())
    }
}

/// Greedy pairing: repeatedly take the unpaired `from` element whose nearest
/// unpaired `to` element is farthest away, and pair the two. Stops once the
/// farthest such distance is zero. `dist` is called as `dist(from, to)`.
pub fn farthest_first(
    from: &BTreeSet<Position>,
    to: &BTreeSet<Position>,
    dist: impl Fn(Position, Position) -> usize,
) -> usize {
    let mut from: Vec<Position> = from.iter().copied().collect();
    let mut to: Vec<Position> = to.iter().copied().collect();
    let mut total = 0;

    loop {
        let farthest = from
            .iter()
            .enumerate()
            .filter_map(|(fi, &f)| {
                to.iter()
                    .enumerate()
                    .map(|(ti, &t)| (dist(f, t), ti))
                    .min()
                    .map(|(d, ti)| (d, fi, ti))
            })
            .min_by_key(|&(d, _, _)| std::cmp::Reverse(d));

        match farthest {
            Some((d, fi, ti)) if d > 0 => {
                total += d;
                from.remove(fi);
                to.remove(ti);
            }
            _ => return total,
        }
    }
}

#[derive(Debug)]
pub struct PairedHeuristic {
    metric: Metric,
    reverse: bool,
}

impl PairedHeuristic {
    /// With `reverse`, targets pick boxes instead of boxes picking targets.
    pub fn new(metric: Metric, reverse: bool) -> Self {
        PairedHeuristic { metric, reverse }
    }
}

impl Heuristic for PairedHeuristic {
    fn estimate(&self, state: &PuzzleState) -> usize {
        let targets = self.metric.layout().targets();
        if self.reverse {
            farthest_first(targets, state.boxes(), |t, b| self.metric.between(b, t))
        } else {
            farthest_first(state.boxes(), targets, |b, t| self.metric.between(b, t))
        }
    }
}

/// Total distance of the cheapest one-to-one pairing of boxes with targets.
/// Falls back to the nearest-target sum when the counts differ.
pub fn assignment_cost(
    boxes: &BTreeSet<Position>,
    targets: &BTreeSet<Position>,
    dist: impl Fn(Position, Position) -> usize,
) -> usize {
    let n = boxes.len();
    if n != targets.len() || n > MAX_BOXES {
        return nearest_sum(boxes, targets, dist);
    }

    let mut costs = ArrayMatrix::<u16, { MAX_BOXES * MAX_BOXES }>::new(n, n);
    for &b in boxes {
        for &t in targets {
            costs.push(u16::try_from(dist(b, t)).unwrap_or(u16::MAX));
        }
    }
    min_cost_assignment(&costs).total()
}

#[derive(Debug)]
pub struct HungarianHeuristic {
    metric: Metric,
}

impl HungarianHeuristic {
    pub fn new(metric: Metric) -> Self {
        HungarianHeuristic { metric }
    }
}

impl Heuristic for HungarianHeuristic {
    fn estimate(&self, state: &PuzzleState) -> usize {
        assignment_cost(state.boxes(), self.metric.layout().targets(), |b, t| {
            self.metric.between(b, t)
        })
    }
}

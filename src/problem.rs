use crate::heuristic::Heuristic;
use crate::layout::Layout;
use crate::search::SearchProblem;
use crate::state::{Push, PuzzleState};
use clap::ValueEnum;
use std::cmp::Ordering;
use std::sync::Arc;

/// What a push costs the search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CostPolicy {
    /// One per push; with an admissible heuristic the solution has the
    /// fewest pushes.
    #[default]
    Optimal,
    /// Free pushes; the search follows the heuristic greedily.
    ///
    /// With `g` fixed at zero many states share an `f` bucket, and each
    /// insert into a bucket shifts its tail, so crowded buckets make
    /// generation linear in the bucket size.
    Fast,
}

impl CostPolicy {
    pub fn push_cost(self) -> usize {
        match self {
            CostPolicy::Optimal => 1,
            CostPolicy::Fast => 0,
        }
    }
}

/// Box pushing as a search problem, starting from a given state.
pub struct PushProblem<H> {
    layout: Arc<Layout>,
    initial: PuzzleState,
    heuristic: H,
    cost: CostPolicy,
}

impl<H: Heuristic> PushProblem<H> {
    pub fn new(layout: Arc<Layout>, initial: PuzzleState, heuristic: H, cost: CostPolicy) -> Self {
        PushProblem {
            layout,
            initial,
            heuristic,
            cost,
        }
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }
}

impl<H: Heuristic> SearchProblem for PushProblem<H> {
    type State = PuzzleState;
    type Move = Push;
    type Moves = Vec<Push>;

    fn initial(&self) -> PuzzleState {
        self.initial.clone()
    }

    fn transitions(&self, state: &PuzzleState) -> Vec<Push> {
        state.legal_pushes(&self.layout)
    }

    fn apply(&self, push: &Push, state: &PuzzleState) -> Option<PuzzleState> {
        state.apply_push(&self.layout, *push).ok()
    }

    fn heuristic(&self, state: &PuzzleState) -> usize {
        self.heuristic.estimate(state)
    }

    fn is_goal(&self, state: &PuzzleState) -> bool {
        state.is_goal(&self.layout)
    }

    fn cost(&self, _push: &Push) -> usize {
        self.cost.push_cost()
    }

    fn compare(&self, a: &PuzzleState, b: &PuzzleState) -> Ordering {
        compare_states(a, b)
    }
}

/// Canonical order over states: boxes first, then the player's region.
///
/// States with the same boxes whose players can reach each other are equal.
/// Otherwise the regions are disjoint and the first cell, in row-major
/// order, reachable in only one of them decides; the state that reaches it
/// is greater.
pub fn compare_states(a: &PuzzleState, b: &PuzzleState) -> Ordering {
    match a.boxes().iter().cmp(b.boxes().iter()) {
        Ordering::Equal => {}
        unequal => return unequal,
    }

    if a.is_reachable(b.player()) {
        return Ordering::Equal;
    }

    for pos in a.reachable().extent() {
        match (a.is_reachable(pos), b.is_reachable(pos)) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
    }
    Ordering::Equal
}

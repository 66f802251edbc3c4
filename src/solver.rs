use crate::existence::ExistenceTrie;
use crate::heuristic::{Distance, Heuristic, HeuristicKind};
use crate::layout::Layout;
use crate::problem::{CostPolicy, PushProblem};
use crate::puzzle::Puzzle;
use crate::search::{AStar, Admission, Progress, SearchConfig, SearchOutcome};
use crate::state::{IllegalMove, Push, PuzzleState};
use crate::worker::{SearchHandle, SearchListener, spawn_search};
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOpts {
    pub heuristic: HeuristicKind,
    /// How matching heuristics measure box-to-target separation.
    pub distance: Distance,
    pub cost: CostPolicy,
    /// Skip states whose boxes and player region were seen before.
    pub existence: bool,
    /// Skip states where the pushed box is deadlocked in a dead spot.
    pub terminal: bool,
    pub search: SearchConfig,
}

impl Default for SolveOpts {
    fn default() -> Self {
        SolveOpts {
            heuristic: HeuristicKind::Hungarian,
            distance: Distance::BoxPath,
            cost: CostPolicy::Optimal,
            existence: true,
            terminal: true,
            search: SearchConfig::default(),
        }
    }
}

/// Admission filter for push searches. The existence check applies to
/// every state; the terminal check only to states reached by a push.
#[derive(Debug)]
pub struct PushFilter {
    layout: Arc<Layout>,
    existence: Option<ExistenceTrie>,
    terminal: bool,
}

impl PushFilter {
    pub fn new(layout: Arc<Layout>, existence: bool, terminal: bool) -> Self {
        PushFilter {
            layout,
            existence: existence.then(ExistenceTrie::new),
            terminal,
        }
    }
}

impl Admission<PuzzleState, Push> for PushFilter {
    fn admit(&mut self, state: &PuzzleState, push: Option<&Push>, _cost: usize) -> bool {
        if let Some(trie) = &mut self.existence {
            if !trie.add(state) {
                return false;
            }
        }
        if self.terminal {
            if let Some(push) = push {
                if state.is_terminal(&self.layout, push.to()) {
                    return false;
                }
            }
        }
        true
    }
}

pub type PushSearch = AStar<PushProblem<Box<dyn Heuristic>>, PushFilter>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub outcome: SearchOutcome<Push>,
    pub nodes_explored: usize,
    pub elapsed: Duration,
}

/// Solves push puzzles from their current state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Solver {
    opts: SolveOpts,
}

impl Solver {
    pub fn new(opts: SolveOpts) -> Self {
        Solver { opts }
    }

    pub fn opts(&self) -> &SolveOpts {
        &self.opts
    }

    /// A search from `puzzle`'s current state, configured but not started.
    pub fn search(&self, puzzle: &Puzzle) -> PushSearch {
        let layout = Arc::clone(puzzle.layout());
        let heuristic = self.opts.heuristic.build(&layout, self.opts.distance);
        let filter = PushFilter::new(Arc::clone(&layout), self.opts.existence, self.opts.terminal);
        let problem = PushProblem::new(layout, puzzle.current().clone(), heuristic, self.opts.cost);
        AStar::with_admission(problem, filter, self.opts.search)
    }

    /// Search on the calling thread.
    pub fn solve(&self, puzzle: &Puzzle) -> SolveResult {
        let mut search = self.search(puzzle);
        let start = Instant::now();
        let outcome = search.solve_and_wait();
        let elapsed = start.elapsed();

        match &outcome {
            SearchOutcome::Solved(pushes) => info!(
                "solved in {} pushes, {} nodes, {} ms ({}/{}, {:?})",
                pushes.len(),
                search.nodes_explored(),
                elapsed.as_millis(),
                self.opts.heuristic,
                self.opts.distance,
                self.opts.cost
            ),
            other => info!(
                "not solved ({:?}) after {} nodes, {} ms",
                other,
                search.nodes_explored(),
                elapsed.as_millis()
            ),
        }

        SolveResult {
            outcome,
            nodes_explored: search.nodes_explored(),
            elapsed,
        }
    }

    /// Search on a background thread.
    pub fn spawn(&self, puzzle: &Puzzle) -> SearchHandle<Push> {
        spawn_search(self.search(puzzle))
    }
}

/// How a background search ended for a [`Replayer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStatus {
    /// The solution, this many pushes long, is now the forward history.
    Replayed(usize),
    NoSolution,
    Aborted,
    Invalid(IllegalMove),
}

/// Listener that replays a found solution into the puzzle's history. Runs
/// on whichever thread pumps the search handle, which must own the puzzle.
pub struct Replayer<'a> {
    puzzle: &'a mut Puzzle,
    expanded: usize,
    last: Option<Progress>,
    status: Option<ReplayStatus>,
}

impl<'a> Replayer<'a> {
    pub fn new(puzzle: &'a mut Puzzle) -> Self {
        Replayer {
            puzzle,
            expanded: 0,
            last: None,
            status: None,
        }
    }

    /// Nodes expanded so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn last_progress(&self) -> Option<Progress> {
        self.last
    }

    pub fn status(&self) -> Option<&ReplayStatus> {
        self.status.as_ref()
    }
}

impl SearchListener<Push> for Replayer<'_> {
    fn progress(&mut self, samples: &[Progress]) {
        self.expanded += samples.len();
        self.last = samples.last().copied().or(self.last);
    }

    fn solved(&mut self, pushes: Option<Vec<Push>>) {
        self.status = Some(match pushes {
            Some(pushes) => match self.puzzle.replay(&pushes) {
                Ok(()) => ReplayStatus::Replayed(pushes.len()),
                Err(err) => ReplayStatus::Invalid(err),
            },
            None => ReplayStatus::NoSolution,
        });
    }

    fn aborted(&mut self) {
        self.status = Some(ReplayStatus::Aborted);
    }
}

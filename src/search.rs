use crate::pqueue::{Offer, PriorityQueue};
use log::debug;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Instant;

/// A state space that can be searched by [`AStar`].
pub trait SearchProblem {
    type State;
    type Move: Clone;
    type Moves: IntoIterator<Item = Self::Move>;

    fn initial(&self) -> Self::State;

    /// Legal moves out of `state`.
    fn transitions(&self, state: &Self::State) -> Self::Moves;

    /// Successor of `state` under `move_`, or `None` if the move does not apply.
    fn apply(&self, move_: &Self::Move, state: &Self::State) -> Option<Self::State>;

    /// Estimated remaining cost from `state` to a goal.
    fn heuristic(&self, state: &Self::State) -> usize;

    fn is_goal(&self, state: &Self::State) -> bool;

    fn cost(&self, move_: &Self::Move) -> usize;

    /// Canonical total order over states. Used to break ties between nodes
    /// of equal estimated total cost, and as the open set's uniqueness key.
    fn compare(&self, a: &Self::State, b: &Self::State) -> Ordering;
}

/// Gate that decides whether a freshly reached state may enter the open set.
/// `move_` is `None` for the initial state; `cost` is the cost of the path
/// that reached it.
pub trait Admission<S, M> {
    fn admit(&mut self, state: &S, move_: Option<&M>, cost: usize) -> bool;
}

/// Admits every state.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdmitAll;

impl<S, M> Admission<S, M> for AdmitAll {
    fn admit(&mut self, _state: &S, _move: Option<&M>, _cost: usize) -> bool {
        true
    }
}

/// What happens when a node arrives whose `(f, canonical)` key is already queued.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The queued node stays and the new one is discarded, even if the new
    /// one was reached more cheaply.
    #[default]
    Keep,
    /// The new node overwrites the queued one.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Give up after expanding this many nodes.
    pub max_nodes: Option<usize>,
    pub duplicates: DuplicatePolicy,
    /// Number of progress samples gathered before they are delivered.
    pub progress_batch: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_nodes: None,
            duplicates: DuplicatePolicy::Keep,
            progress_batch: 256,
        }
    }
}

/// One expansion: cost so far and estimated cost remaining of the expanded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub cost: usize,
    pub estimate: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<M> {
    Solved(Vec<M>),
    /// The open set ran dry without reaching a goal.
    Impossible,
    /// The node budget was exhausted.
    Cutoff,
    /// Cancelled before completion.
    Aborted,
}

impl<M> SearchOutcome<M> {
    pub fn moves(&self) -> Option<&[M]> {
        match self {
            SearchOutcome::Solved(moves) => Some(moves),
            _ => None,
        }
    }
}

struct Node<S, M> {
    state: S,
    cost: usize,
    estimate: usize,
    move_: Option<M>,
    parent: Option<usize>,
}

/// Best-first search over an implicit graph.
///
/// Nodes live in an arena and point at their parent by index; the open set
/// holds arena indices ordered by `(cost + estimate, canonical order)`.
pub struct AStar<P: SearchProblem, A = AdmitAll> {
    problem: P,
    admission: A,
    config: SearchConfig,
    nodes_explored: usize,
}

impl<P: SearchProblem> AStar<P, AdmitAll> {
    pub fn new(problem: P) -> Self {
        Self::with_admission(problem, AdmitAll, SearchConfig::default())
    }
}

impl<P: SearchProblem, A: Admission<P::State, P::Move>> AStar<P, A> {
    pub fn with_admission(problem: P, admission: A, config: SearchConfig) -> Self {
        AStar {
            problem,
            admission,
            config,
            nodes_explored: 0,
        }
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    /// Run to completion on the calling thread. Never aborts.
    pub fn solve_and_wait(&mut self) -> SearchOutcome<P::Move> {
        let never = AtomicBool::new(false);
        self.run(&never, |_| {})
    }

    /// Run until a goal is found, the open set empties, the node budget is
    /// spent, or `cancel` is raised. `cancel` is polled once per expansion.
    /// `on_progress` receives one sample per expanded node, in order.
    pub fn run(
        &mut self,
        cancel: &AtomicBool,
        mut on_progress: impl FnMut(Progress),
    ) -> SearchOutcome<P::Move> {
        let start = Instant::now();
        let outcome = self.search(cancel, &mut on_progress);
        debug!(
            "search finished: {} after {} nodes in {} ms",
            match &outcome {
                SearchOutcome::Solved(moves) => format!("solved in {} moves", moves.len()),
                SearchOutcome::Impossible => "no solution".to_string(),
                SearchOutcome::Cutoff => "node budget exhausted".to_string(),
                SearchOutcome::Aborted => "aborted".to_string(),
            },
            self.nodes_explored,
            start.elapsed().as_millis()
        );
        outcome
    }

    fn search(
        &mut self,
        cancel: &AtomicBool,
        on_progress: &mut impl FnMut(Progress),
    ) -> SearchOutcome<P::Move> {
        self.nodes_explored = 0;
        let mut nodes: Vec<Node<P::State, P::Move>> = Vec::new();
        let mut open: PriorityQueue<usize> = PriorityQueue::new();

        let initial = self.problem.initial();
        debug!("initial estimate: {}", self.problem.heuristic(&initial));
        self.offer(&mut nodes, &mut open, initial, 0, None, None);

        while let Some((_, idx)) = open.pop_min() {
            if cancel.load(AtomicOrdering::Relaxed) {
                return SearchOutcome::Aborted;
            }
            if let Some(max_nodes) = self.config.max_nodes {
                if self.nodes_explored >= max_nodes {
                    return SearchOutcome::Cutoff;
                }
            }
            self.nodes_explored += 1;

            let node = &nodes[idx];
            on_progress(Progress {
                cost: node.cost,
                estimate: node.estimate,
            });

            if self.problem.is_goal(&node.state) {
                return SearchOutcome::Solved(Self::path_to(&nodes, idx));
            }

            let cost = node.cost;
            let successors: Vec<(P::State, P::Move, usize)> = self
                .problem
                .transitions(&node.state)
                .into_iter()
                .filter_map(|move_| {
                    let state = self.problem.apply(&move_, &node.state)?;
                    let step = self.problem.cost(&move_);
                    Some((state, move_, step))
                })
                .collect();

            for (state, move_, step) in successors {
                self.offer(&mut nodes, &mut open, state, cost + step, Some(move_), Some(idx));
            }
        }

        SearchOutcome::Impossible
    }

    fn offer(
        &mut self,
        nodes: &mut Vec<Node<P::State, P::Move>>,
        open: &mut PriorityQueue<usize>,
        state: P::State,
        cost: usize,
        move_: Option<P::Move>,
        parent: Option<usize>,
    ) {
        if !self.admission.admit(&state, move_.as_ref(), cost) {
            return;
        }

        let estimate = self.problem.heuristic(&state);
        let idx = nodes.len();
        nodes.push(Node {
            state,
            cost,
            estimate,
            move_,
            parent,
        });

        let problem = &self.problem;
        let policy = self.config.duplicates;
        let arena: &[Node<P::State, P::Move>] = nodes;
        let offered = open.offer(
            cost + estimate,
            idx,
            |&a, &b| problem.compare(&arena[a].state, &arena[b].state),
            |_, _| policy == DuplicatePolicy::Replace,
        );

        // A rejected node is the newest in the arena and nothing points at it yet.
        if let Offer::Rejected(rejected) = offered {
            debug_assert_eq!(rejected, idx);
            nodes.pop();
        }
    }

    fn path_to(nodes: &[Node<P::State, P::Move>], mut idx: usize) -> Vec<P::Move> {
        let mut moves = Vec::new();
        while let Some(parent) = nodes[idx].parent {
            if let Some(move_) = &nodes[idx].move_ {
                moves.push(move_.clone());
            }
            idx = parent;
        }
        moves.reverse();
        moves
    }
}

pub mod deadlocks;
pub mod existence;
pub mod grid;
pub mod heuristic;
pub mod history;
pub mod hungarian;
pub mod layout;
pub mod levels;
pub mod pathfinder;
pub mod pqueue;
pub mod problem;
pub mod puzzle;
pub mod search;
pub mod solver;
pub mod state;
pub mod worker;

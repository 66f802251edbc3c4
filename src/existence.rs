use crate::grid::Position;
use crate::state::PuzzleState;
use std::collections::BTreeMap;

/// Remembers which box arrangements have been seen, per player region.
///
/// A state is keyed by its boxes in row-major order followed by the first
/// reachable cell, so states whose players can reach each other share a key.
#[derive(Debug, Clone)]
pub struct ExistenceTrie {
    // nodes[0] is the root; each node maps the next key element to a child index.
    nodes: Vec<BTreeMap<Position, usize>>,
    len: usize,
}

impl ExistenceTrie {
    pub fn new() -> Self {
        ExistenceTrie {
            nodes: vec![BTreeMap::new()],
            len: 0,
        }
    }

    /// Record `state`. Returns true if nothing equivalent was recorded before.
    pub fn add(&mut self, state: &PuzzleState) -> bool {
        let key = state
            .boxes()
            .iter()
            .copied()
            .chain(state.reachable().first_set());
        self.insert(key)
    }

    /// Number of distinct keys recorded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn insert(&mut self, key: impl IntoIterator<Item = Position>) -> bool {
        let mut node = 0;
        let mut created = false;
        for pos in key {
            node = match self.nodes[node].get(&pos) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(BTreeMap::new());
                    self.nodes[node].insert(pos, child);
                    created = true;
                    child
                }
            };
        }
        if created {
            self.len += 1;
        }
        created
    }
}

impl Default for ExistenceTrie {
    fn default() -> Self {
        Self::new()
    }
}

use crate::search::{AStar, Admission, Progress, SearchOutcome, SearchProblem};
use crossbeam_channel::{Receiver, TryRecvError};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

/// Message from a search worker to its handle.
#[derive(Debug)]
pub enum SearchEvent<M> {
    Progress(Vec<Progress>),
    /// Always the last event of a search.
    Finished {
        outcome: SearchOutcome<M>,
        nodes_explored: usize,
    },
}

/// Receives the results of a background search on the thread that pumps
/// its [`SearchHandle`].
pub trait SearchListener<M> {
    fn progress(&mut self, samples: &[Progress]);

    /// `None` when the search space was exhausted without reaching a goal.
    fn solved(&mut self, moves: Option<Vec<M>>);

    fn aborted(&mut self);

    /// The node budget ran out.
    fn exhausted(&mut self, nodes_explored: usize) {
        let _ = nodes_explored;
        self.solved(None);
    }
}

#[derive(Debug)]
pub struct SearchHandle<M> {
    cancel: Arc<AtomicBool>,
    rx: Receiver<SearchEvent<M>>,
    join: Option<JoinHandle<()>>,
    finished: bool,
}

impl<M> SearchHandle<M> {
    /// Ask the worker to stop. Takes effect before its next expansion.
    pub fn abort(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether the final event has been delivered.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Deliver every event queued so far without blocking. Returns true
    /// once the final event has been delivered.
    pub fn pump(&mut self, listener: &mut impl SearchListener<M>) -> bool {
        while !self.finished {
            match self.rx.try_recv() {
                Ok(event) => self.dispatch(event, listener),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Worker died without reporting.
                    self.finish(listener, None);
                }
            }
        }
        self.finished
    }

    /// Block until the search ends, delivering every event on the way.
    pub fn wait(mut self, listener: &mut impl SearchListener<M>) {
        while !self.finished {
            match self.rx.recv() {
                Ok(event) => self.dispatch(event, listener),
                Err(_) => self.finish(listener, None),
            }
        }
        self.join_worker();
    }

    /// Block until the search ends, discarding progress.
    pub fn wait_outcome(mut self) -> SearchOutcome<M> {
        let mut outcome = SearchOutcome::Aborted;
        while let Ok(event) = self.rx.recv() {
            if let SearchEvent::Finished { outcome: o, .. } = event {
                outcome = o;
                break;
            }
        }
        self.finished = true;
        self.join_worker();
        outcome
    }

    fn dispatch(&mut self, event: SearchEvent<M>, listener: &mut impl SearchListener<M>) {
        match event {
            SearchEvent::Progress(samples) => listener.progress(&samples),
            SearchEvent::Finished {
                outcome,
                nodes_explored,
            } => {
                self.finish(listener, Some((outcome, nodes_explored)));
            }
        }
    }

    fn finish(
        &mut self,
        listener: &mut impl SearchListener<M>,
        result: Option<(SearchOutcome<M>, usize)>,
    ) {
        self.finished = true;
        match result {
            Some((SearchOutcome::Solved(moves), _)) => listener.solved(Some(moves)),
            Some((SearchOutcome::Impossible, _)) => listener.solved(None),
            Some((SearchOutcome::Cutoff, nodes)) => listener.exhausted(nodes),
            Some((SearchOutcome::Aborted, _)) | None => listener.aborted(),
        }
        self.join_worker();
    }

    fn join_worker(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl<M> Drop for SearchHandle<M> {
    fn drop(&mut self) {
        if !self.finished {
            self.abort();
        }
    }
}

/// Run `search` on a dedicated thread. Progress samples are batched
/// according to the search's configuration.
pub fn spawn_search<P, A>(mut search: AStar<P, A>) -> SearchHandle<P::Move>
where
    P: SearchProblem + Send + 'static,
    P::Move: Send + 'static,
    A: Admission<P::State, P::Move> + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_for_thread = Arc::clone(&cancel);
    let (tx, rx) = crossbeam_channel::unbounded::<SearchEvent<P::Move>>();

    let join = std::thread::spawn(move || {
        let batch_size = search.config().progress_batch.max(1);
        let mut batch = Vec::with_capacity(batch_size);

        let outcome = search.run(cancel_for_thread.as_ref(), |sample| {
            batch.push(sample);
            if batch.len() >= batch_size {
                debug!("progress: cost {}, estimate {}", sample.cost, sample.estimate);
                let _ = tx.send(SearchEvent::Progress(std::mem::take(&mut batch)));
            }
        });

        if !batch.is_empty() {
            let _ = tx.send(SearchEvent::Progress(batch));
        }
        let _ = tx.send(SearchEvent::Finished {
            outcome,
            nodes_explored: search.nodes_explored(),
        });
    });

    SearchHandle {
        cancel,
        rx,
        join: Some(join),
        finished: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{AdmitAll, SearchConfig};
    use std::cmp::Ordering as CmpOrdering;

    /// Count upwards; never reaches a goal unless `goal` is set.
    struct Counter {
        goal: Option<u64>,
    }

    impl SearchProblem for Counter {
        type State = u64;
        type Move = u64;
        type Moves = Vec<u64>;

        fn initial(&self) -> u64 {
            0
        }

        fn transitions(&self, _state: &u64) -> Vec<u64> {
            vec![1]
        }

        fn apply(&self, move_: &u64, state: &u64) -> Option<u64> {
            Some(state + move_)
        }

        fn heuristic(&self, _state: &u64) -> usize {
            0
        }

        fn is_goal(&self, state: &u64) -> bool {
            Some(*state) == self.goal
        }

        fn cost(&self, _move: &u64) -> usize {
            1
        }

        fn compare(&self, a: &u64, b: &u64) -> CmpOrdering {
            a.cmp(b)
        }
    }

    #[derive(Default)]
    struct Recorder {
        samples: usize,
        solved: Option<Option<Vec<u64>>>,
        aborted: bool,
        exhausted: Option<usize>,
        events_after_final: usize,
    }

    impl Recorder {
        fn done(&self) -> bool {
            self.solved.is_some() || self.aborted || self.exhausted.is_some()
        }
    }

    impl SearchListener<u64> for Recorder {
        fn progress(&mut self, samples: &[Progress]) {
            if self.done() {
                self.events_after_final += 1;
            }
            self.samples += samples.len();
        }

        fn solved(&mut self, moves: Option<Vec<u64>>) {
            self.solved = Some(moves);
        }

        fn aborted(&mut self) {
            self.aborted = true;
        }

        fn exhausted(&mut self, nodes_explored: usize) {
            self.exhausted = Some(nodes_explored);
        }
    }

    fn config(batch: usize, max_nodes: Option<usize>) -> SearchConfig {
        SearchConfig {
            progress_batch: batch,
            max_nodes,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_solved_after_all_progress() {
        let search = AStar::with_admission(Counter { goal: Some(10) }, AdmitAll, config(3, None));
        let handle = spawn_search(search);
        let mut recorder = Recorder::default();
        handle.wait(&mut recorder);

        assert_eq!(recorder.solved, Some(Some(vec![1; 10])));
        assert_eq!(recorder.samples, 11);
        assert_eq!(recorder.events_after_final, 0);
        assert!(!recorder.aborted);
    }

    #[test]
    fn test_exhausted() {
        let search = AStar::with_admission(Counter { goal: None }, AdmitAll, config(4, Some(25)));
        let mut recorder = Recorder::default();
        spawn_search(search).wait(&mut recorder);

        assert_eq!(recorder.exhausted, Some(25));
        assert_eq!(recorder.samples, 25);
        assert!(recorder.solved.is_none());
    }

    #[test]
    fn test_abort() {
        let search = AStar::with_admission(Counter { goal: None }, AdmitAll, config(1024, None));
        let mut handle = spawn_search(search);
        handle.abort();

        let mut recorder = Recorder::default();
        while !handle.pump(&mut recorder) {
            std::thread::yield_now();
        }

        assert!(handle.is_finished());
        assert!(recorder.aborted);
        assert!(recorder.solved.is_none());
        assert_eq!(recorder.events_after_final, 0);
    }

    #[test]
    fn test_wait_outcome() {
        let search = AStar::with_admission(Counter { goal: Some(3) }, AdmitAll, config(1, None));
        let outcome = spawn_search(search).wait_outcome();
        assert_eq!(outcome, SearchOutcome::Solved(vec![1, 1, 1]));
    }
}

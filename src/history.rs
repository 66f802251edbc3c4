/// An undo/redo line of snapshots with a cursor.
///
/// Entries after the cursor form the forward branch. Writing a new next
/// entry drops that branch; [`History::last`] and [`History::set_last`]
/// operate on its tail wherever the cursor is.
#[derive(Debug, Clone)]
pub struct History<S> {
    entries: Vec<S>,
    cursor: usize,
}

impl<S> History<S> {
    pub fn new(initial: S) -> Self {
        History {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: S) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }

    pub fn current(&self) -> &S {
        &self.entries[self.cursor]
    }

    /// Replace the entry at the cursor. Earlier entries stay, the forward
    /// branch is dropped.
    pub fn replace_current(&mut self, state: S) {
        self.entries.truncate(self.cursor);
        self.entries.push(state);
    }

    /// Drop the forward branch and, if `state` is given, make it the only
    /// entry after the cursor. The cursor does not move.
    pub fn set_next(&mut self, state: Option<S>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.extend(state);
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    /// Advance the cursor, returning the new current entry.
    pub fn next(&mut self) -> Option<&S> {
        if !self.has_next() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Step the cursor back, returning the new current entry.
    pub fn previous(&mut self) -> Option<&S> {
        if !self.has_previous() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn last(&self) -> &S {
        // Never empty.
        &self.entries[self.entries.len() - 1]
    }

    /// Append `state` after the tail. `None` leaves the history untouched.
    pub fn set_last(&mut self, state: Option<S>) {
        self.entries.extend(state);
    }

    /// Number of entries; at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation() {
        let mut history = History::new(0);
        assert_eq!(*history.current(), 0);
        assert!(!history.has_next());
        assert!(!history.has_previous());
        assert_eq!(history.next(), None);
        assert_eq!(history.previous(), None);

        history.set_next(Some(1));
        assert_eq!(*history.current(), 0);
        assert_eq!(history.next(), Some(&1));
        history.set_next(Some(2));
        assert_eq!(history.next(), Some(&2));

        assert_eq!(history.previous(), Some(&1));
        assert_eq!(history.previous(), Some(&0));
        assert_eq!(history.previous(), None);
        assert_eq!(*history.last(), 2);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_set_next_truncates() {
        let mut history = History::new('a');
        history.set_last(Some('b'));
        history.set_last(Some('c'));
        assert_eq!(*history.last(), 'c');

        history.next();
        history.set_next(Some('x'));
        assert_eq!(history.len(), 3);
        assert_eq!(*history.last(), 'x');

        history.set_next(None);
        assert!(!history.has_next());
        assert_eq!(*history.last(), 'b');
    }

    #[test]
    fn test_replace_current() {
        let mut history = History::new(0);
        history.set_last(Some(1));
        history.set_last(Some(2));
        history.next();

        history.replace_current(10);
        assert_eq!(*history.current(), 10);
        assert!(!history.has_next());
        assert_eq!(history.previous(), Some(&0));
        assert_eq!(history.next(), Some(&10));
    }

    #[test]
    fn test_set_last_ignores_cursor() {
        let mut history = History::new(0);
        history.set_last(Some(1));
        history.set_last(None);
        history.set_last(Some(2));
        assert_eq!(history.position(), 0);
        assert_eq!(*history.current(), 0);
        assert_eq!(*history.last(), 2);
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(0);
        history.set_next(Some(1));
        history.next();
        history.reset(5);
        assert_eq!(*history.current(), 5);
        assert_eq!(history.len(), 1);
        assert!(!history.has_previous());
    }

    #[test]
    fn test_truncation_keeps_current() {
        let mut history = History::new(0);
        history.set_last(Some(1));
        history.set_next(None);
        assert_eq!(history.len(), 1);

        history.replace_current(7);
        history.set_next(None);
        assert_eq!(history.len(), 1);
        assert_eq!(*history.last(), 7);
    }
}

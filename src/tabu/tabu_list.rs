//! Short-term memory of forbidden moves.

use std::collections::{HashSet, VecDeque};

use super::Move;

/// Fixed-capacity FIFO of recently reversed moves.
///
/// Holds at most `tenure` distinct moves. Pushing a move that is already
/// listed moves it to the back, so it stays forbidden for another full
/// tenure.
#[derive(Debug, Clone)]
pub struct TabuList {
    tenure: usize,
    queue: VecDeque<Move>,
    set: HashSet<Move>,
}

impl TabuList {
    /// Creates an empty list.
    ///
    /// # Panics
    ///
    /// Panics if `tenure` is 0.
    pub fn new(tenure: usize) -> Self {
        assert!(tenure > 0, "called `TabuList::new()` with zero tenure");
        Self {
            tenure,
            queue: VecDeque::with_capacity(tenure + 1),
            set: HashSet::with_capacity(tenure + 1),
        }
    }

    /// Forbids a move, expiring the oldest one when full.
    pub fn push(&mut self, mv: Move) {
        if !self.set.insert(mv) {
            if let Some(pos) = self.queue.iter().position(|m| *m == mv) {
                self.queue.remove(pos);
            }
        }
        self.queue.push_back(mv);
        while self.queue.len() > self.tenure {
            if let Some(oldest) = self.queue.pop_front() {
                self.set.remove(&oldest);
            }
        }
    }

    /// Whether a move is currently forbidden.
    #[inline]
    pub fn contains(&self, mv: &Move) -> bool {
        self.set.contains(mv)
    }

    /// Number of listed moves.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is listed.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Forgets every listed move.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Dimension;

    fn mv(entry: usize) -> Move {
        Move::new(entry, Dimension::Slot, 0)
    }

    #[test]
    #[should_panic(expected = "called `TabuList::new()` with zero tenure")]
    fn test_zero_tenure_panics() {
        let _ = TabuList::new(0);
    }

    #[test]
    fn test_fifo_expiry() {
        let mut list = TabuList::new(2);
        list.push(mv(1));
        list.push(mv(2));
        assert!(list.contains(&mv(1)));
        list.push(mv(3));
        assert!(!list.contains(&mv(1)));
        assert!(list.contains(&mv(2)));
        assert!(list.contains(&mv(3)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_repush_refreshes() {
        let mut list = TabuList::new(2);
        list.push(mv(1));
        list.push(mv(2));
        list.push(mv(1));
        assert_eq!(list.len(), 2);
        list.push(mv(3));
        assert!(list.contains(&mv(1)));
        assert!(!list.contains(&mv(2)));
    }

    #[test]
    fn test_clear() {
        let mut list = TabuList::new(3);
        list.push(mv(1));
        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(&mv(1)));
    }
}

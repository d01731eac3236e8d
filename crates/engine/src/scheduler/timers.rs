// Deadline-ordered timer queue with cancellable handles.
//
// Entries with the same deadline fire in scheduling order.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub struct TimerQueue<T> {
    entries: BTreeMap<(Instant, u64), T>,
    deadlines: HashMap<u64, Instant>,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self { entries: BTreeMap::new(), deadlines: HashMap::new(), next_seq: 0 }
    }

    pub fn schedule(&mut self, at: Instant, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((at, seq), task);
        self.deadlines.insert(seq, at);
        TimerId(seq)
    }

    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(at) => self.entries.remove(&(at, id.0)).is_some(),
            None => false,
        }
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id.0)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(at, _)| *at)
    }

    /// Remove and return the earliest timer whose deadline is at or before
    /// `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, Instant, T)> {
        let (&(at, seq), _) = self.entries.iter().next()?;
        if at > now {
            return None;
        }
        let task = self.entries.remove(&(at, seq))?;
        self.deadlines.remove(&seq);
        Some((TimerId(seq), at, task))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

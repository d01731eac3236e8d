// Randomness behind the simulated activity.
//
// Every random decision the scheduler makes (delays, ghost picks, presence
// coin flips) goes through `Randomness`, so tests can swap in
// `ScriptedRandomness` and get deterministic timing.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// Build a range; bounds given in the wrong order are swapped.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_secs(min: u64, max: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    pub fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    pub fn contains(&self, delay: Duration) -> bool {
        self.min <= delay && delay <= self.max
    }
}

pub trait Randomness {
    /// A delay within `range` (inclusive).
    fn delay(&mut self, range: DelayRange) -> Duration;
    /// An index in `0..len`. Returns 0 when `len` is 0.
    fn index(&mut self, len: usize) -> usize;
    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
}

/// `rand`-backed randomness used outside of tests.
pub struct ThreadRandomness {
    rng: StdRng,
}

impl ThreadRandomness {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for ThreadRandomness {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomness for ThreadRandomness {
    fn delay(&mut self, range: DelayRange) -> Duration {
        let min = range.min.as_millis() as u64;
        let max = range.max.as_millis() as u64;
        if min >= max {
            return range.min;
        }
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    fn chance(&mut self, probability: f64) -> bool {
        let p = if probability.is_nan() { 0.0 } else { probability.clamp(0.0, 1.0) };
        self.rng.gen_bool(p)
    }
}

/// Which end of a delay range `ScriptedRandomness` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPick {
    Shortest,
    Longest,
}

/// Deterministic randomness for tests.
///
/// Delays always come from one end of the range. Indices and coin flips are
/// served from queues, then fall back to `0` and `default_chance`.
#[derive(Debug, Clone)]
pub struct ScriptedRandomness {
    delay: DelayPick,
    indices: VecDeque<usize>,
    chances: VecDeque<bool>,
    default_chance: bool,
}

impl ScriptedRandomness {
    pub fn shortest() -> Self {
        Self::new(DelayPick::Shortest)
    }

    pub fn longest() -> Self {
        Self::new(DelayPick::Longest)
    }

    pub fn new(delay: DelayPick) -> Self {
        Self { delay, indices: VecDeque::new(), chances: VecDeque::new(), default_chance: true }
    }

    pub fn with_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(indices);
        self
    }

    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    pub fn with_default_chance(mut self, value: bool) -> Self {
        self.default_chance = value;
        self
    }
}

impl Randomness for ScriptedRandomness {
    fn delay(&mut self, range: DelayRange) -> Duration {
        match self.delay {
            DelayPick::Shortest => range.min,
            DelayPick::Longest => range.max,
        }
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.indices.pop_front().unwrap_or(0) % len
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(self.default_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_range_swaps_reversed_bounds() {
        let range = DelayRange::from_secs(8, 3);
        assert_eq!(range.min, Duration::from_secs(3));
        assert_eq!(range.max, Duration::from_secs(8));
    }

    #[test]
    fn thread_randomness_stays_within_bounds() {
        let mut random = ThreadRandomness::seeded(7);
        let range = DelayRange::from_secs(3, 8);
        for _ in 0..200 {
            assert!(range.contains(random.delay(range)));
            assert!(random.index(6) < 6);
        }
    }

    #[test]
    fn thread_randomness_degenerate_inputs() {
        let mut random = ThreadRandomness::seeded(1);
        let point = DelayRange::from_secs(5, 5);
        assert_eq!(random.delay(point), Duration::from_secs(5));
        assert_eq!(random.index(0), 0);
        assert!(!random.chance(0.0));
        assert!(random.chance(1.0));
        assert!(!random.chance(f64::NAN));
    }

    #[test]
    fn seeded_sequences_repeat() {
        let range = DelayRange::from_secs(10, 30);
        let mut a = ThreadRandomness::seeded(42);
        let mut b = ThreadRandomness::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.delay(range), b.delay(range));
        }
    }

    #[test]
    fn scripted_randomness_replays_queues() {
        let mut random = ScriptedRandomness::longest()
            .with_indices([2, 9])
            .with_chances([false])
            .with_default_chance(true);

        assert_eq!(random.delay(DelayRange::from_secs(1, 3)), Duration::from_secs(3));
        assert_eq!(random.index(5), 2);
        assert_eq!(random.index(5), 4);
        assert_eq!(random.index(5), 0);
        assert!(!random.chance(0.7));
        assert!(random.chance(0.7));
    }
}

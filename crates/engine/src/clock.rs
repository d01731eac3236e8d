// Editor clock: a monotonic instant paired with its wall-clock anchor.
//
// All timers are expressed as `Instant` deadlines. Wall-clock timestamps
// (`lastSeen`, `lastModified`) are derived from the same reading so that a
// virtually advanced clock produces consistent timestamps in tests.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
    origin_wall: DateTime<Utc>,
    now: Instant,
}

impl Clock {
    /// Clock anchored at the current instant and wall time.
    pub fn start() -> Self {
        Self::starting_at(Instant::now(), Utc::now())
    }

    pub fn starting_at(origin: Instant, origin_wall: DateTime<Utc>) -> Self {
        Self { origin, origin_wall, now: origin }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn wall_now(&self) -> DateTime<Utc> {
        self.wall_at(self.now)
    }

    /// Wall-clock time corresponding to `at`. Instants before the origin map
    /// to the origin.
    pub fn wall_at(&self, at: Instant) -> DateTime<Utc> {
        let elapsed = at.saturating_duration_since(self.origin);
        let delta =
            chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_wall + delta
    }

    /// Move the clock forward. Never moves backwards.
    pub fn advance_to(&mut self, at: Instant) {
        if at > self.now {
            self.now = at;
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

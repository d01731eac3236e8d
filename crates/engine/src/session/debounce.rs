// Autosave debouncer.
//
// One pending slot per autosave kind, each with its own window. A new edit
// of the same kind resets that kind's timer; kinds never coalesce with each
// other.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::AutosaveConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutosaveKind {
    Title,
    Content,
    /// Commits and then runs one edit cycle.
    Formatting,
}

/// Coalesces rapid edits per kind.
///
/// Call `push_at()` for each edit, then `pop_ready_at()` until it returns
/// `None` to collect the kinds whose window has elapsed.
pub struct Debouncer {
    config: AutosaveConfig,
    /// Time of the most recent edit per kind.
    pending: HashMap<AutosaveKind, Instant>,
}

impl Debouncer {
    pub fn new(config: AutosaveConfig) -> Self {
        Self { config, pending: HashMap::new() }
    }

    /// Record an edit. A pending edit of the same kind is replaced and its
    /// timer restarts.
    pub fn push_at(&mut self, kind: AutosaveKind, now: Instant) {
        self.pending.insert(kind, now);
    }

    pub fn deadline(&self, kind: AutosaveKind) -> Option<Instant> {
        self.pending.get(&kind).map(|last| *last + self.config.window(kind))
    }

    /// Earliest pending deadline, or None if nothing is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.by_deadline().first().map(|(_, at)| *at)
    }

    /// Remove and return the ready kind with the earliest deadline.
    pub fn pop_ready_at(&mut self, now: Instant) -> Option<(AutosaveKind, Instant)> {
        let (kind, at) = self.by_deadline().into_iter().next().filter(|(_, at)| *at <= now)?;
        self.pending.remove(&kind);
        Some((kind, at))
    }

    /// Drop a pending edit without firing it.
    pub fn cancel(&mut self, kind: AutosaveKind) -> bool {
        self.pending.remove(&kind).is_some()
    }

    /// Remove everything pending, in deadline order. Used for flushes.
    pub fn take_pending(&mut self) -> Vec<AutosaveKind> {
        let kinds = self.by_deadline().into_iter().map(|(kind, _)| kind).collect();
        self.pending.clear();
        kinds
    }

    pub fn is_pending(&self, kind: AutosaveKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Number of kinds still waiting in their window.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn by_deadline(&self) -> Vec<(AutosaveKind, Instant)> {
        let mut ready: Vec<_> = self
            .pending
            .iter()
            .map(|(kind, last)| (*kind, *last + self.config.window(*kind)))
            .collect();
        // Stable tie-break so equal deadlines don't depend on hash order.
        ready.sort_by_key(|(kind, at)| (*at, rank(*kind)));
        ready
    }
}

fn rank(kind: AutosaveKind) -> u8 {
    match kind {
        AutosaveKind::Title => 0,
        AutosaveKind::Content => 1,
        AutosaveKind::Formatting => 2,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn debouncer() -> Debouncer {
        Debouncer::new(AutosaveConfig::default())
    }

    // ── Single edit lifecycle ──────────────────────────────────────

    #[test]
    fn content_not_ready_before_window() {
        let mut debouncer = debouncer();
        let now = Instant::now();
        debouncer.push_at(AutosaveKind::Content, now);

        assert!(debouncer.pop_ready_at(now + ms(1999)).is_none());
        assert_eq!(debouncer.pending_count(), 1);
    }

    #[test]
    fn content_ready_after_window() {
        let mut debouncer = debouncer();
        let now = Instant::now();
        debouncer.push_at(AutosaveKind::Content, now);

        let ready = debouncer.pop_ready_at(now + ms(2000));
        assert_eq!(ready, Some((AutosaveKind::Content, now + ms(2000))));
        assert_eq!(debouncer.pending_count(), 0);
        assert!(debouncer.pop_ready_at(now + ms(5000)).is_none());
    }

    // ── Coalescing ─────────────────────────────────────────────────

    #[test]
    fn repeated_edits_reset_the_timer() {
        let mut debouncer = debouncer();
        let now = Instant::now();

        debouncer.push_at(AutosaveKind::Title, now);
        debouncer.push_at(AutosaveKind::Title, now + ms(800));

        assert_eq!(debouncer.pending_count(), 1);
        assert!(debouncer.pop_ready_at(now + ms(1000)).is_none());
        assert!(debouncer.pop_ready_at(now + ms(1800)).is_some());
    }

    #[test]
    fn kinds_are_independent() {
        let mut debouncer = debouncer();
        let now = Instant::now();

        debouncer.push_at(AutosaveKind::Content, now);
        debouncer.push_at(AutosaveKind::Title, now + ms(500));
        assert_eq!(debouncer.pending_count(), 2);

        // Title (1s window) settles before content (2s window).
        assert_eq!(debouncer.next_deadline(), Some(now + ms(1500)));
        let first = debouncer.pop_ready_at(now + ms(3000)).map(|(k, _)| k);
        let second = debouncer.pop_ready_at(now + ms(3000)).map(|(k, _)| k);
        assert_eq!(first, Some(AutosaveKind::Title));
        assert_eq!(second, Some(AutosaveKind::Content));
    }

    #[test]
    fn cancel_and_take_pending() {
        let mut debouncer = debouncer();
        let now = Instant::now();
        debouncer.push_at(AutosaveKind::Formatting, now);
        debouncer.push_at(AutosaveKind::Content, now);
        debouncer.push_at(AutosaveKind::Title, now);

        assert!(debouncer.cancel(AutosaveKind::Title));
        assert!(!debouncer.cancel(AutosaveKind::Title));
        assert!(debouncer.is_pending(AutosaveKind::Content));

        assert_eq!(
            debouncer.take_pending(),
            vec![AutosaveKind::Formatting, AutosaveKind::Content]
        );
        assert!(debouncer.next_deadline().is_none());
    }

    #[test]
    fn custom_windows_respected() {
        let config = AutosaveConfig { title_ms: 50, content_ms: 200, formatting_ms: 10 };
        let mut debouncer = Debouncer::new(config);
        let now = Instant::now();
        debouncer.push_at(AutosaveKind::Content, now);

        assert_eq!(debouncer.deadline(AutosaveKind::Content), Some(now + ms(200)));
        assert!(debouncer.deadline(AutosaveKind::Title).is_none());
    }

    proptest! {
        #[test]
        fn a_burst_settles_exactly_once(gaps in proptest::collection::vec(0u64..2000, 1..30)) {
            let mut debouncer = debouncer();
            let start = Instant::now();
            let mut at = start;
            let mut fired = 0;

            for gap in gaps {
                at += ms(gap);
                while debouncer.pop_ready_at(at).is_some() {
                    fired += 1;
                }
                debouncer.push_at(AutosaveKind::Content, at);
            }
            prop_assert_eq!(fired, 0);

            while debouncer.pop_ready_at(at + ms(2000)).is_some() {
                fired += 1;
            }
            prop_assert_eq!(fired, 1);
        }
    }
}

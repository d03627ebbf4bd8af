use core::time::Duration;
use std::collections::BTreeMap;

/// Fire-and-forget delayed callbacks on a virtual clock.
///
/// Entries run in order of due time, ties broken by scheduling order. There
/// is no cancellation: a callback whose target disappeared is expected to
/// notice that itself.
pub struct TimerQueue<T> {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current virtual time since the page was created.
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `entry` to run `delay` after the current virtual time.
    pub fn schedule(&mut self, delay: Duration, entry: T) {
        let due = self.now.saturating_add(delay);
        self.pending.insert((due, self.next_seq), entry);
        self.next_seq = self.next_seq.saturating_add(1);
    }

    /// Due time of the earliest pending entry.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest entry due at or before `limit`, moving the clock to its due time.
    pub fn pop_due(&mut self, limit: Duration) -> Option<T> {
        let (&(due, _), _) = self.pending.first_key_value()?;
        if due > limit {
            return None;
        }
        self.now = self.now.max(due);
        self.pending.pop_first().map(|(_, entry)| entry)
    }

    /// Move the clock forward to `time` without running anything.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

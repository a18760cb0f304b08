#![forbid(unsafe_code)]

//! Deterministic delayed-task scheduling.
//!
//! Controllers never call `setTimeout` themselves. They park typed tasks in a
//! [`Scheduler`] keyed by a monotonic due time, and the host drives
//! [`Scheduler::pop_due`] with its own clock. Tests use
//! [`DeterministicClock`] to move time in exact steps.
//!
//! # Invariants
//!
//! 1. Tasks come out in due-time order; ties keep scheduling order.
//! 2. A cancelled task never comes out.
//! 3. `pop_due(now)` never returns a task whose due time is after `now`.
//!
//! # Failure Modes
//!
//! - Cancelling an unknown or already-fired id returns `false`.
//! - Overflowing due times saturate at `Duration::MAX`.

use std::time::Duration;

/// Monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Scheduled<T> {
    id: TaskId,
    due: Duration,
    task: T,
}

/// Queue of tasks waiting for a due time.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Schedule `task` to fire at `now + delay`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: T) -> TaskId {
        self.schedule_at(now.saturating_add(delay), task)
    }

    /// Schedule `task` to fire at the absolute time `due`.
    pub fn schedule_at(&mut self, due: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        // Keep `pending` sorted by (due, id) so pops are O(1) from the front.
        let idx = self.pending.partition_point(|s| s.due <= due);
        self.pending.insert(idx, Scheduled { id, due, task });
        id
    }

    /// Cancel a pending task. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending task matching `pred`. Returns how many were removed.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| !pred(&s.task));
        before - self.pending.len()
    }

    /// Drop all pending tasks.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        self.pop_due_entry(now).map(|(_, task)| task)
    }

    /// Like [`pop_due`](Self::pop_due), also returning the task's due time.
    ///
    /// Chained tasks scheduled from the returned due time keep their
    /// spacing even when `now` is late.
    pub fn pop_due_entry(&mut self, now: Duration) -> Option<(Duration, T)> {
        if self.pending.first().is_some_and(|s| s.due <= now) {
            let s = self.pending.remove(0);
            Some((s.due, s.task))
        } else {
            None
        }
    }

    /// Due time of the earliest pending task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first().map(|s| s.due)
    }

    /// Whether any pending task matches `pred`.
    #[must_use]
    pub fn contains(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.pending.iter().any(|s| pred(&s.task))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Latest-wins debounce: only the last value in a burst is released, once
/// `quiet` has elapsed without a newer value.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    quiet: Duration,
    pending: Option<(Duration, T)>,
}

impl<T> Debounce<T> {
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record `value` observed at `now`, replacing any earlier pending value.
    pub fn push(&mut self, now: Duration, value: T) {
        self.pending = Some((now.saturating_add(self.quiet), value));
    }

    /// Release the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((due, _)) if *due <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// When the pending value will be released.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    /// Whether a value is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_pop_reports_due_time() {
        let mut s = Scheduler::new();
        s.schedule(Duration::ZERO, Duration::from_millis(40), 'x');
        assert_eq!(
            s.pop_due_entry(Duration::from_millis(90)),
            Some((Duration::from_millis(40), 'x'))
        );
        assert!(s.is_empty());
    }

    const MS_100: Duration = Duration::from_millis(100);
    const MS_300: Duration = Duration::from_millis(300);

    #[test]
    fn pops_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(Duration::ZERO, MS_300, "late");
        s.schedule(Duration::ZERO, MS_100, "early");
        assert_eq!(s.next_deadline(), Some(MS_100));
        assert_eq!(s.pop_due(MS_300), Some("early"));
        assert_eq!(s.pop_due(MS_300), Some("late"));
        assert_eq!(s.pop_due(MS_300), None);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule_at(MS_100, 1);
        s.schedule_at(MS_100, 2);
        s.schedule_at(MS_100, 3);
        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(MS_100)).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn not_due_stays_pending() {
        let mut s = Scheduler::new();
        s.schedule(Duration::ZERO, MS_300, ());
        assert_eq!(s.pop_due(Duration::from_millis(299)), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn cancel_removes_task() {
        let mut s = Scheduler::new();
        let a = s.schedule_at(MS_100, 'a');
        s.schedule_at(MS_100, 'b');
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(s.pop_due(MS_300), Some('b'));
    }

    #[test]
    fn cancel_where_filters() {
        let mut s = Scheduler::new();
        s.schedule_at(MS_100, 1);
        s.schedule_at(MS_100, 2);
        s.schedule_at(MS_100, 3);
        assert_eq!(s.cancel_where(|t| t % 2 == 1), 2);
        assert!(s.contains(|t| *t == 2));
        assert!(!s.contains(|t| *t == 1));
    }

    #[test]
    fn saturating_due_time() {
        let mut s = Scheduler::new();
        s.schedule(Duration::MAX, MS_100, ());
        assert_eq!(s.next_deadline(), Some(Duration::MAX));
    }

    #[test]
    fn clock_advances() {
        let mut clock = DeterministicClock::new();
        clock.advance(MS_100);
        clock.advance(MS_100);
        assert_eq!(clock.now(), Duration::from_millis(200));
        clock.set(Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn debounce_latest_wins() {
        let mut d = Debounce::new(MS_300);
        d.push(Duration::ZERO, 1);
        d.push(MS_100, 2);
        assert_eq!(d.poll(MS_300), None);
        assert_eq!(d.deadline(), Some(Duration::from_millis(400)));
        assert_eq!(d.poll(Duration::from_millis(400)), Some(2));
        assert!(!d.is_pending());
    }
}

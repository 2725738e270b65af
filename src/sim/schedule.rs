//! Host-clock task scheduler
//!
//! Replaces ad-hoc interval timers with explicit repeating tasks that can be
//! cancelled individually or all at once. Time only moves when the host
//! calls [`Scheduler::pop_due`], so the same clock readings always fire the
//! same tasks in the same order.

use serde::{Deserialize, Serialize};

/// Which session process a task drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// One-second countdown
    Countdown,
    /// Spawn attempt (level-dependent period)
    Spawn,
    /// Expiry sweep
    Sweep,
}

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u32);

/// A task that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TaskHandle,
    pub kind: TaskKind,
    /// The time this firing was due (may be earlier than the host's `now`)
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
struct Task {
    handle: TaskHandle,
    kind: TaskKind,
    period_ms: u64,
    next_due_ms: u64,
    /// Next firing would lie past the end of the clock
    exhausted: bool,
}

/// Repeating tasks keyed by handle
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_handle: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a repeating task whose first firing is due at `first_due_ms`
    pub fn schedule(&mut self, kind: TaskKind, period_ms: u64, first_due_ms: u64) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.tasks.push(Task {
            handle,
            kind,
            period_ms: period_ms.max(1),
            next_due_ms: first_due_ms,
            exhausted: false,
        });
        handle
    }

    /// Cancel one task. Returns false if it was not scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn period(&self, handle: TaskHandle) -> Option<u64> {
        self.tasks
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.period_ms)
    }

    /// Change a task's period. The next firing is one new period after `now_ms`.
    pub fn set_period(&mut self, handle: TaskHandle, period_ms: u64, now_ms: u64) -> bool {
        match self.tasks.iter_mut().find(|t| t.handle == handle) {
            Some(task) => {
                task.period_ms = period_ms.max(1);
                task.next_due_ms = now_ms.saturating_add(task.period_ms);
                task.exhausted = false;
                true
            }
            None => false,
        }
    }

    /// Earliest due time across all tasks
    pub fn next_due(&self) -> Option<u64> {
        self.tasks
            .iter()
            .filter(|t| !t.exhausted)
            .map(|t| t.next_due_ms)
            .min()
    }

    /// Take the earliest task due at or before `now_ms` (ties go to the
    /// earlier-scheduled task) and advance it by one period. A task that is
    /// several periods behind fires once per call until it catches up. A task
    /// whose next firing would overflow the clock stops firing.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Fired> {
        let task = self
            .tasks
            .iter_mut()
            .filter(|t| !t.exhausted && t.next_due_ms <= now_ms)
            .min_by_key(|t| (t.next_due_ms, t.handle))?;

        let fired = Fired {
            handle: task.handle,
            kind: task.kind,
            at_ms: task.next_due_ms,
        };
        match task.next_due_ms.checked_add(task.period_ms) {
            Some(next) => task.next_due_ms = next,
            None => task.exhausted = true,
        }
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, now_ms: u64) -> Vec<(TaskKind, u64)> {
        std::iter::from_fn(|| scheduler.pop_due(now_ms))
            .map(|f| (f.kind, f.at_ms))
            .collect()
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskKind::Countdown, 1000, 1000);
        scheduler.schedule(TaskKind::Spawn, 2000, 0);
        scheduler.schedule(TaskKind::Sweep, 500, 500);

        assert_eq!(
            drain(&mut scheduler, 2000),
            vec![
                (TaskKind::Spawn, 0),
                (TaskKind::Sweep, 500),
                (TaskKind::Countdown, 1000),
                (TaskKind::Sweep, 1000),
                (TaskKind::Sweep, 1500),
                (TaskKind::Countdown, 2000),
                (TaskKind::Spawn, 2000),
                (TaskKind::Sweep, 2000),
            ]
        );
        assert_eq!(scheduler.next_due(), Some(2500));
        assert!(drain(&mut scheduler, 2400).is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.schedule(TaskKind::Countdown, 1000, 0);
        let b = scheduler.schedule(TaskKind::Sweep, 500, 0);
        assert!(scheduler.cancel(a));
        assert!(!scheduler.cancel(a));
        assert!(!scheduler.is_scheduled(a));
        assert!(scheduler.is_scheduled(b));
        assert_eq!(drain(&mut scheduler, 0), vec![(TaskKind::Sweep, 0)]);

        scheduler.cancel_all();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pop_due(u64::MAX / 2), None);
    }

    #[test]
    fn test_set_period_restarts_interval() {
        let mut scheduler = Scheduler::new();
        let spawn = scheduler.schedule(TaskKind::Spawn, 2000, 0);
        assert_eq!(drain(&mut scheduler, 0).len(), 1);

        assert!(scheduler.set_period(spawn, 1500, 700));
        assert_eq!(scheduler.period(spawn), Some(1500));
        assert_eq!(scheduler.next_due(), Some(2200));
        assert_eq!(drain(&mut scheduler, 3700), vec![(TaskKind::Spawn, 2200), (TaskKind::Spawn, 3700)]);
    }

    #[test]
    fn test_end_of_clock_fires_once() {
        let mut scheduler = Scheduler::new();
        let h = scheduler.schedule(TaskKind::Sweep, 500, u64::MAX - 100);
        assert_eq!(drain(&mut scheduler, u64::MAX), vec![(TaskKind::Sweep, u64::MAX - 100)]);
        assert!(scheduler.is_scheduled(h));
        assert_eq!(scheduler.next_due(), None);

        // Huge periods saturate instead of wrapping
        assert!(scheduler.set_period(h, u64::MAX, 10));
        assert_eq!(scheduler.next_due(), Some(u64::MAX));
        assert_eq!(drain(&mut scheduler, u64::MAX), vec![(TaskKind::Sweep, u64::MAX)]);
        assert!(scheduler.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut scheduler = Scheduler::new();
        let h = scheduler.schedule(TaskKind::Sweep, 0, 0);
        assert_eq!(scheduler.period(h), Some(1));
        assert_eq!(drain(&mut scheduler, 2).len(), 3);
    }
}

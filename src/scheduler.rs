//! Timer scheduling.
//!
//! Scheduled work is plain data: a [`Task`] names what should happen and the
//! controller decides how to carry it out when the task comes due. The
//! [`TimerQueue`] keeps deadlines on the monotonic clock and is driven by the
//! event loop through [`TimerQueue::pop_due`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Fires if the pointer is still down after the long-press threshold.
    LongPressCheck,
    /// Restores the background to the base color after a flash.
    FlashRevert,
    /// Refreshes the stopwatch label and ages circles.
    StopwatchTick,
    /// Flashes the background.
    PeriodicFlash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// A task whose deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub id: TaskId,
    pub task: Task,
    pub deadline: Instant,
}

pub trait Scheduler {
    /// Runs `task` once, `delay` after `now`.
    fn schedule_once(&mut self, task: Task, now: Instant, delay: Duration) -> TaskId;

    /// Runs `task` every `period`, the first time `period` after `now`.
    fn schedule_interval(&mut self, task: Task, now: Instant, period: Duration) -> TaskId;

    /// Cancels a pending task. Returns `false` if it already ran or never existed.
    fn unschedule(&mut self, id: TaskId) -> bool;
}

#[derive(Debug, Clone)]
struct Entry {
    id: TaskId,
    task: Task,
    deadline: Instant,
    period: Option<Duration>,
}

// Guards against a zero period re-arming into the same instant forever.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<Entry>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, task: Task, deadline: Instant, period: Option<Duration>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push(Entry {
            id,
            task,
            deadline,
            period,
        });
        id
    }

    /// Removes and returns the earliest task due at `now`.
    ///
    /// Ties on the deadline are resolved in scheduling order. Interval tasks
    /// are re-armed on their own cadence; periods missed while the loop was
    /// stalled are skipped rather than replayed.
    pub fn pop_due(&mut self, now: Instant) -> Option<Due> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[index];
        let due = Due {
            id: entry.id,
            task: entry.task,
            deadline: entry.deadline,
        };

        match entry.period {
            Some(period) => {
                let period = period.max(MIN_PERIOD);
                entry.deadline += period;
                while entry.deadline <= now {
                    entry.deadline += period;
                }
            }
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(due)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Number of pending entries for `task`.
    pub fn pending(&self, task: Task) -> usize {
        self.entries.iter().filter(|e| e.task == task).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn schedule_once(&mut self, task: Task, now: Instant, delay: Duration) -> TaskId {
        self.insert(task, now + delay, None)
    }

    fn schedule_interval(&mut self, task: Task, now: Instant, period: Duration) -> TaskId {
        let period = period.max(MIN_PERIOD);
        self.insert(task, now + period, Some(period))
    }

    fn unschedule(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

//! Virtual-time task queue standing in for browser timers and animation frames.
//!
//! Timers are ordered by `(due, sequence)` so that two tasks due at the same
//! instant fire in the order they were scheduled. Frame tasks queue up until
//! the next `take_frame_tasks` call, which the driver makes once per frame.
//! Nothing here knows about sessions; handlers get plain [`Task`] values back.

use crate::replay::ReplayTask;
use crate::session::SessionTask;
use fnv::FnvHashSet;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Work item delivered back to the instrument when it comes due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Session(SessionTask),
    Replay(ReplayTask),
}

/// Handle for cancelling a pending timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer {
    due: Duration,
    sequence: u64,
    task: Task,
}

// Min-heap: earliest (due, sequence) first.
impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.sequence == other.sequence
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_sequence: u64,
    timers: BinaryHeap<Timer>,
    cancelled: FnvHashSet<u64>,
    frame_tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed from the current virtual time.
    pub fn schedule_after(&mut self, delay: Duration, task: Task) -> TimerId {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.timers.push(Timer {
            due: self.now + delay,
            sequence,
            task,
        });
        TimerId(sequence)
    }

    /// Drop a pending timer. Cancelling one that already fired is a no-op.
    pub fn cancel(&mut self, id: TimerId) {
        if self.timers.iter().any(|t| t.sequence == id.0) {
            self.cancelled.insert(id.0);
        }
    }

    /// Queue `task` for the next animation frame.
    pub fn request_frame(&mut self, task: Task) {
        self.frame_tasks.push(task);
    }

    /// Pop the earliest live timer due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        while let Some(top) = self.timers.peek() {
            if top.due > until {
                return None;
            }
            let timer = self.timers.pop()?;
            if self.cancelled.remove(&timer.sequence) {
                continue;
            }
            self.now = self.now.max(timer.due);
            return Some(timer.task);
        }
        None
    }

    /// Move the clock forward; it never runs backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Shift the clock and every pending timer forward by `by`, as if the
    /// elapsed span never happened. Relative order is unchanged.
    pub fn postpone(&mut self, by: Duration) {
        if by.is_zero() {
            return;
        }
        self.now += by;
        let timers = std::mem::take(&mut self.timers).into_vec();
        self.timers = timers
            .into_iter()
            .map(|t| Timer {
                due: t.due + by,
                ..t
            })
            .collect();
    }

    /// Drain the tasks queued for this frame. Tasks queued while these run wait for the next frame.
    pub fn take_frame_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.frame_tasks)
    }

    /// Number of live timers still waiting.
    pub fn pending_timers(&self) -> usize {
        self.timers.len() - self.cancelled.len()
    }

    pub fn pending_frame_tasks(&self) -> usize {
        self.frame_tasks.len()
    }
}


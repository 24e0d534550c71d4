//! Deferred task scheduling
//!
//! Highlights run on a single-threaded event loop. Stagger delays and fade
//! timers are deferred callbacks, never threads, so tasks are `!Send` and
//! shared state lives in `Rc`/`RefCell`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Identifies a scheduled task for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub type Task = Box<dyn FnOnce() + 'static>;

pub trait Scheduler {
    /// Run `task` once after `delay` has elapsed
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Drop a pending task; unknown or already-fired ids are ignored
    fn cancel(&self, id: TimerId);
}

/// Scheduler driven by a manual virtual clock
///
/// Nothing runs until [`VirtualScheduler::advance`] moves the clock. Tasks
/// fire in due-time order; tasks with the same due time fire in the order
/// they were scheduled. A task scheduled while the clock is advancing runs in
/// the same advance if it falls due before the target time.
#[derive(Default)]
pub struct VirtualScheduler {
    state: RefCell<VirtualState>,
}

#[derive(Default)]
struct VirtualState {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
    due_by_id: HashMap<u64, Duration>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks still waiting to fire
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Move the clock forward, running every task that falls due
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;

        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }

        self.state.borrow_mut().now = target;
        ran
    }

    /// Advance to the last pending due time, running everything
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next_due = {
                let state = self.state.borrow();
                match state.queue.keys().next() {
                    Some(&(due, _)) => due.saturating_sub(state.now),
                    None => return ran,
                }
            };
            ran += self.advance(next_due);
        }
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        let key = *state.queue.keys().next()?;
        if key.0 > target {
            return None;
        }
        state.now = key.0;
        state.due_by_id.remove(&key.1);
        state.queue.remove(&key)
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.queue.insert((due, id), task);
        state.due_by_id.insert(id, due);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        if let Some(due) = state.due_by_id.remove(&id.0) {
            state.queue.remove(&(due, id.0));
        }
    }
}

//! Virtual-clock scheduler for deterministic tests and single-threaded drivers.

use super::{Scheduler, TimerCallback, TimerCell, TimerHandle, TimerStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

struct Entry {
    deadline: Duration,
    seq: u64,
    cell: Arc<TimerCell>,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry>,
}

/// Scheduler whose clock only moves when [`ManualScheduler::advance`] is called.
///
/// Callbacks fire in deadline order (ties in scheduling order) and always
/// outside the scheduler's own lock, so a callback may schedule or cancel
/// other timers.
pub struct ManualScheduler {
    origin: DateTime<Utc>,
    state: Mutex<ManualState>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

impl ManualScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A scheduler whose clock reads `origin` until the first `advance`
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            state: Mutex::default(),
        }
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of timers still waiting to fire
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| e.cell.status() == TimerStatus::Scheduled)
            .count()
    }

    /// Move the clock forward by `by`, firing every timer that falls due.
    /// Returns how many callbacks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut fired = 0;

        loop {
            let due = {
                let mut state = self.state.lock();
                state
                    .entries
                    .retain(|e| e.cell.status() == TimerStatus::Scheduled);

                let next = state
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.deadline <= target)
                    .min_by_key(|(_, e)| (e.deadline, e.seq))
                    .map(|(idx, _)| idx);

                match next {
                    Some(idx) => {
                        let entry = state.entries.swap_remove(idx);
                        state.now = entry.deadline;
                        entry
                    }
                    None => {
                        state.now = target;
                        break;
                    }
                }
            };

            if due.cell.try_fire() {
                (due.callback)();
                fired += 1;
            }
        }

        fired
    }

    /// Advance exactly to the earliest pending deadline, if any
    pub fn advance_to_next(&self) -> usize {
        let gap = {
            let state = self.state.lock();
            state
                .entries
                .iter()
                .filter(|e| e.cell.status() == TimerStatus::Scheduled)
                .map(|e| e.deadline.saturating_sub(state.now))
                .min()
        };
        gap.map_or(0, |gap| self.advance(gap))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let cell = TimerCell::new();
        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        let deadline = state.now + delay;
        state.entries.push(Entry {
            deadline,
            seq,
            cell: cell.clone(),
            callback,
        });
        TimerHandle::new(cell, None)
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.elapsed();
        chrono::Duration::from_std(elapsed).map_or(self.origin, |elapsed| self.origin + elapsed)
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("origin", &self.origin)
            .field("elapsed", &state.now)
            .field("entries", &state.entries.len())
            .finish()
    }
}

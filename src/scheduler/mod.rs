//! # Deferred Completion Scheduling
//!
//! The workflow never reaches for ambient timer functions. Every delayed
//! transition is handed to an injected [`Scheduler`], which returns a
//! [`TimerHandle`] owned by the state that requested it.
//!
//! - [`TokioScheduler`] runs callbacks on a tokio runtime via `tokio::time::sleep`,
//!   so paused-clock tests (`start_paused = true`) advance deterministically.
//! - [`ManualScheduler`] is a runtime-free virtual clock driven by `advance`.

pub mod manual;
pub mod runtime;

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

/// One-shot callback run when a timer expires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Schedules one-shot callbacks after a delay
pub trait Scheduler: Send + Sync + fmt::Debug {
    /// Schedule `callback` to run once after `delay`.
    ///
    /// The callback must not run if the returned handle is cancelled (or
    /// dropped) before the delay elapses.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Current time on this scheduler's clock. Timestamps recorded by the
    /// workflow come from here so they agree with timer deadlines.
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("no tokio runtime available to schedule deferred completion")]
    NoRuntime,
}

/// Lifecycle of a single scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Scheduled,
    Fired,
    Cancelled,
}

const SCHEDULED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared status cell between a handle and the scheduler entry it refers to.
///
/// Exactly one of `try_fire` / `cancel` wins the transition out of `Scheduled`.
#[derive(Debug)]
pub(crate) struct TimerCell(AtomicU8);

impl TimerCell {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU8::new(SCHEDULED)))
    }

    pub(crate) fn try_fire(&self) -> bool {
        self.0
            .compare_exchange(SCHEDULED, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn cancel(&self) -> bool {
        self.0
            .compare_exchange(SCHEDULED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn status(&self) -> TimerStatus {
        match self.0.load(Ordering::Acquire) {
            SCHEDULED => TimerStatus::Scheduled,
            FIRED => TimerStatus::Fired,
            _ => TimerStatus::Cancelled,
        }
    }
}

/// Owning handle for a scheduled callback. Dropping the handle cancels the timer.
pub struct TimerHandle {
    cell: Arc<TimerCell>,
    abort: Option<tokio::task::AbortHandle>,
}

impl TimerHandle {
    pub(crate) fn new(cell: Arc<TimerCell>, abort: Option<tokio::task::AbortHandle>) -> Self {
        Self { cell, abort }
    }

    /// Cancel the timer. Returns `true` if this call prevented the callback from running.
    pub fn cancel(&self) -> bool {
        let prevented = self.cell.cancel();
        if prevented {
            if let Some(abort) = &self.abort {
                abort.abort();
            }
        }
        prevented
    }

    pub fn status(&self) -> TimerStatus {
        self.cell.status()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("status", &self.status())
            .finish()
    }
}

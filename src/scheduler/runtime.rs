use super::{Scheduler, SchedulerError, TimerCallback, TimerCell, TimerHandle};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::trace;

/// Scheduler backed by a tokio runtime.
///
/// `now` follows the tokio clock from construction onwards, so a paused
/// runtime reports the same virtual time its timers run on.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
    origin: DateTime<Utc>,
    started: Instant,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            origin: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Bind to the runtime of the calling context
    pub fn current() -> Result<Self, SchedulerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| SchedulerError::NoRuntime)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let cell = TimerCell::new();
        let task_cell = cell.clone();

        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if task_cell.try_fire() {
                callback();
            } else {
                trace!("timer cancelled before expiry");
            }
        });

        TimerHandle::new(cell, Some(task.abort_handle()))
    }

    fn now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.started.elapsed())
            .map_or(self.origin, |elapsed| self.origin + elapsed)
    }
}

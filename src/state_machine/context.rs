//! # Workflow Context
//!
//! The only caller-facing surface of the booking workflow. The context owns the
//! single active [`StateHandler`], forwards every action to it and installs the
//! successor the handler hands back.
//!
//! ## Concurrency
//!
//! The active-state slot sits behind one `parking_lot::Mutex`. Caller actions
//! and deferred completions both run entirely under that lock, so every
//! transition is atomic and no intermediate state is observable. History is
//! written under the same lock.
//!
//! [`StateAction`]s run after the lock is released, in install order, so an
//! action may read or drive the workflow. When several threads install at once
//! the first one to start draining runs the actions for all of them.
//!
//! Each installed handler receives the next *generation* number. A completion
//! timer captures the generation of the `pending` handler that scheduled it:
//!
//! - leaving `pending` cancels that handler's timer explicitly;
//! - a timer that was already firing when it got cancelled is rejected by
//!   [`CurrentStateGuard`] and has no effect.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use booking_workflow::WorkflowContext;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = WorkflowContext::builder()
//!     .completion_delay(Duration::from_secs(3))
//!     .build()?;
//!
//! println!("{}", workflow.request_action()); // Event booked with id: ...
//! println!("{}", workflow.request_action()); // Please wait...
//! tokio::time::sleep(Duration::from_secs(3)).await;
//! println!("{}", workflow.request_cancel()); // Event cancelled
//! # Ok(())
//! # }
//! ```

use super::actions::{LogTransitionAction, PublishTransitionEventAction, StateAction};
use super::errors::GuardError;
use super::events::BookingEvent;
use super::guards::{CurrentStateGuard, StateGuard, StateIdentity, TransitionAllowedGuard};
use super::handlers::{Outcome, StateHandler, StateServices};
use super::persistence::{InMemoryTransitionPersistence, TransitionPersistence, TransitionRecord};
use super::states::BookingState;
use crate::config::WorkflowConfig;
use crate::error::BookingResult;
use crate::events::publisher::{EventPublisher, TransitionEvent};
use crate::identifiers::{BookingId, IdGenerator, UuidIdGenerator};
use crate::scheduler::{Scheduler, TimerHandle, TimerStatus, TokioScheduler};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace, warn};

/// A transition the context has just installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTransition {
    pub booking_id: Option<BookingId>,
    pub from: BookingState,
    pub to: BookingState,
    pub event: BookingEvent,
    pub generation: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Result of [`WorkflowContext::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub response: String,
    pub from: BookingState,
    pub to: BookingState,
    pub transitioned: bool,
}

/// Point-in-time view of the active handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub state: BookingState,
    pub booking_id: Option<BookingId>,
    /// Identity of the installed handler; increments on every transition
    pub generation: u64,
    pub pending_since: Option<DateTime<Utc>>,
}

struct Slot {
    handler: StateHandler,
    generation: u64,
}

impl Slot {
    fn identity(&self) -> StateIdentity {
        StateIdentity {
            state: self.handler.state(),
            generation: self.generation,
        }
    }
}

struct Shared {
    slot: Mutex<Slot>,
    scheduler: Arc<dyn Scheduler>,
    ids: Arc<dyn IdGenerator>,
    completion_delay: Duration,
    persistence: Arc<dyn TransitionPersistence>,
    publisher: EventPublisher,
    actions: Vec<Box<dyn StateAction>>,
    /// Installed transitions whose actions have not run yet, in install order
    outbox: Mutex<VecDeque<AppliedTransition>>,
    /// Held by the single thread currently running actions
    draining: Mutex<()>,
}

/// Services handed to the active handler while it runs under the slot lock
struct SlotServices<'a> {
    shared: &'a Arc<Shared>,
    next_generation: u64,
}

impl StateServices for SlotServices<'_> {
    fn next_id(&self) -> BookingId {
        self.shared.ids.next_id()
    }

    fn schedule_completion(&self, id: &BookingId) -> TimerHandle {
        let target = Arc::downgrade(self.shared);
        let generation = self.next_generation;
        let id = id.clone();

        trace!(
            booking_id = %id,
            generation = generation,
            delay_ms = self.shared.completion_delay.as_millis() as u64,
            "Scheduling booking completion"
        );

        self.shared.scheduler.schedule(
            self.shared.completion_delay,
            Box::new(move || complete_pending(&target, generation, id)),
        )
    }

    fn now(&self) -> DateTime<Utc> {
        self.shared.scheduler.now()
    }
}

/// Deferred completion entry point, run by the scheduler
fn complete_pending(target: &Weak<Shared>, generation: u64, id: BookingId) {
    match target.upgrade() {
        Some(shared) => {
            shared.complete_pending(generation, id);
        }
        None => trace!(booking_id = %id, "Workflow dropped before completion fired"),
    }
}

impl Shared {
    fn complete_pending(&self, generation: u64, id: BookingId) -> bool {
        let completed = {
            let mut slot = self.slot.lock();
            let identity = slot.identity();
            match CurrentStateGuard::new(generation).check(&identity) {
                Ok(()) => self
                    .install(&mut slot, BookingEvent::Complete, StateHandler::Booked { id })
                    .is_ok(),
                Err(err) => {
                    debug!(booking_id = %id, error = %err, "Dropping stale booking completion");
                    false
                }
            }
        };

        if completed {
            self.run_actions();
        }
        completed
    }

    /// Install the handler's successor, if any, and describe the result
    fn apply(&self, slot: &mut Slot, event: BookingEvent, outcome: Outcome) -> ActionOutcome {
        let from = slot.handler.state();
        let Outcome { response, next } = outcome;

        let to = match next {
            Some(next) => match self.install(slot, event, next) {
                Ok(transition) => transition.to,
                Err(err) => {
                    error!(from = %from, event = %event, error = %err, "Refusing successor state");
                    from
                }
            },
            None => {
                debug!(state = %from, event = %event, "Action answered without transition");
                from
            }
        };

        ActionOutcome {
            response,
            from,
            to,
            transitioned: from != to,
        }
    }

    /// The single writer of the active-state slot.
    ///
    /// Records the transition in history and queues it for the actions, which
    /// run once the slot lock is released.
    fn install(
        &self,
        slot: &mut Slot,
        event: BookingEvent,
        next: StateHandler,
    ) -> Result<AppliedTransition, GuardError> {
        let from = slot.handler.state();
        TransitionAllowedGuard::new(event, next.state()).check(&from)?;

        let previous = std::mem::replace(&mut slot.handler, next);
        slot.generation += 1;

        if previous.retire() {
            debug!(
                booking_id = ?previous.booking_id().map(BookingId::as_str),
                "Cancelled completion timer of replaced pending state"
            );
        }

        let transition = AppliedTransition {
            booking_id: slot.handler.booking_id().cloned(),
            from,
            to: slot.handler.state(),
            event,
            generation: slot.generation,
            occurred_at: self.scheduler.now(),
        };

        info!(
            booking_id = ?transition.booking_id.as_ref().map(BookingId::as_str),
            from = %transition.from,
            to = %transition.to,
            event = %event,
            generation = transition.generation,
            "Booking state transition"
        );

        if let Err(err) = self.persistence.persist_transition(&transition) {
            warn!(
                generation = transition.generation,
                error = %err,
                "Failed to record transition"
            );
        }

        self.outbox.lock().push_back(transition.clone());
        Ok(transition)
    }

    /// Run queued actions in install order, outside the slot lock.
    ///
    /// One thread drains at a time. Transitions queued while another thread (or
    /// an action on this thread) is draining are left to that drainer.
    fn run_actions(&self) {
        loop {
            let Some(draining) = self.draining.try_lock() else {
                return;
            };

            loop {
                let next = self.outbox.lock().pop_front();
                let Some(transition) = next else {
                    break;
                };
                for action in &self.actions {
                    if let Err(err) = action.execute(&transition) {
                        warn!(
                            action = action.description(),
                            error = %err,
                            "Transition action failed"
                        );
                    }
                }
            }

            drop(draining);
            // A transition queued between the last pop and the unlock has no drainer yet.
            if self.outbox.lock().is_empty() {
                return;
            }
        }
    }
}

/// Handle to a booking workflow. Clones share the same workflow.
#[derive(Clone)]
pub struct WorkflowContext {
    shared: Arc<Shared>,
}

impl WorkflowContext {
    pub fn builder() -> WorkflowContextBuilder {
        WorkflowContextBuilder::default()
    }

    /// Build a workflow on the current tokio runtime with default collaborators
    pub fn new(config: WorkflowConfig) -> BookingResult<Self> {
        Self::builder().config(config).build()
    }

    /// Ask the active state to book
    pub fn request_action(&self) -> String {
        self.dispatch(BookingEvent::Book).response
    }

    /// Ask the active state to cancel
    pub fn request_cancel(&self) -> String {
        self.dispatch(BookingEvent::Cancel).response
    }

    /// Route a caller event to the active state and install its successor, if any
    pub fn dispatch(&self, event: BookingEvent) -> ActionOutcome {
        let outcome = {
            let mut slot = self.shared.slot.lock();
            let handled = {
                let services = SlotServices {
                    shared: &self.shared,
                    next_generation: slot.generation + 1,
                };
                slot.handler.handle(event, &services)
            };
            self.shared.apply(&mut slot, event, handled)
        };

        self.shared.run_actions();
        outcome
    }

    pub fn current_state(&self) -> BookingState {
        self.shared.slot.lock().handler.state()
    }

    pub fn booking_id(&self) -> Option<BookingId> {
        self.shared.slot.lock().handler.booking_id().cloned()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let slot = self.shared.slot.lock();
        StateSnapshot {
            state: slot.handler.state(),
            booking_id: slot.handler.booking_id().cloned(),
            generation: slot.generation,
            pending_since: match &slot.handler {
                StateHandler::Pending(pending) => Some(pending.pending_since()),
                _ => None,
            },
        }
    }

    /// Status of the active pending state's completion timer
    pub fn completion_timer(&self) -> Option<TimerStatus> {
        match &self.shared.slot.lock().handler {
            StateHandler::Pending(pending) => Some(pending.timer_status()),
            _ => None,
        }
    }

    pub fn completion_delay(&self) -> Duration {
        self.shared.completion_delay
    }

    pub fn history(&self) -> Vec<TransitionRecord> {
        self.shared.persistence.history()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.shared.publisher.subscribe()
    }

    /// Apply a handler outcome as if the active state had produced it for `event`
    #[cfg(test)]
    fn apply_outcome(&self, event: BookingEvent, outcome: Outcome) -> ActionOutcome {
        let result = {
            let mut slot = self.shared.slot.lock();
            self.shared.apply(&mut slot, event, outcome)
        };
        self.shared.run_actions();
        result
    }
}

impl fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("snapshot", &self.snapshot())
            .field("completion_delay", &self.shared.completion_delay)
            .finish()
    }
}

/// Builder wiring a [`WorkflowContext`] to its collaborators
#[derive(Default)]
pub struct WorkflowContextBuilder {
    config: WorkflowConfig,
    scheduler: Option<Arc<dyn Scheduler>>,
    ids: Option<Arc<dyn IdGenerator>>,
    publisher: Option<EventPublisher>,
    persistence: Option<Arc<dyn TransitionPersistence>>,
    actions: Vec<Box<dyn StateAction>>,
}

impl WorkflowContextBuilder {
    pub fn config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn completion_delay(mut self, delay: Duration) -> Self {
        self.config = WorkflowConfig::with_delay(delay);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn event_publisher(mut self, publisher: EventPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn persistence(mut self, persistence: Arc<dyn TransitionPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Add a side effect run after the built-in log and publish actions
    pub fn action(mut self, action: Box<dyn StateAction>) -> Self {
        self.actions.push(action);
        self
    }

    /// Validate the configuration and build the workflow in state `open`.
    ///
    /// Without an explicit scheduler this binds to the current tokio runtime.
    pub fn build(self) -> BookingResult<WorkflowContext> {
        self.config.validate()?;

        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler::current()?),
        };
        let ids = self.ids.unwrap_or_else(|| Arc::new(UuidIdGenerator));
        let publisher = self.publisher.unwrap_or_default();
        let persistence = self
            .persistence
            .unwrap_or_else(|| Arc::new(InMemoryTransitionPersistence::new()));

        let mut actions: Vec<Box<dyn StateAction>> = vec![
            Box::new(LogTransitionAction),
            Box::new(PublishTransitionEventAction::new(publisher.clone())),
        ];
        actions.extend(self.actions);

        let shared = Shared {
            slot: Mutex::new(Slot {
                handler: StateHandler::Open,
                generation: 0,
            }),
            scheduler,
            ids,
            completion_delay: self.config.completion_delay(),
            persistence,
            publisher,
            actions,
            outbox: Mutex::default(),
            draining: Mutex::new(()),
        };

        Ok(WorkflowContext {
            shared: Arc::new(shared),
        })
    }
}

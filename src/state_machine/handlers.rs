//! # Booking State Handlers
//!
//! One variant per workflow stage. Each handler answers the two caller actions
//! and, when it wants to move the workflow, hands back a freshly constructed
//! successor for the context to install.
//!
//! | State     | book                 | cancel                  |
//! |-----------|----------------------|-------------------------|
//! | open      | -> pending (new id)  | stay, "nothing booked"  |
//! | pending   | stay, "processing"   | stay, "processing"      |
//! | booked    | stay, already booked | -> cancelled (same id)  |
//! | cancelled | -> pending (same id) | stay, already cancelled |
//!
//! `pending` additionally moves to `booked` on its own once its completion
//! timer fires.

use super::errors::{StateMachineError, StateMachineResult};
use super::events::BookingEvent;
use super::states::BookingState;
use crate::constants::messages;
use crate::identifiers::BookingId;
use crate::scheduler::{TimerHandle, TimerStatus};
use chrono::{DateTime, Utc};

/// Capabilities a handler needs to construct its successor
pub trait StateServices {
    /// Allocate a new booking identifier
    fn next_id(&self) -> BookingId;

    /// Schedule the deferred `pending -> booked` completion for `id`.
    ///
    /// The completion targets the handler about to be installed; it is dropped if
    /// the workflow has moved on by the time it fires.
    fn schedule_completion(&self, id: &BookingId) -> TimerHandle;

    /// Current time on the clock that drives the completion timer
    fn now(&self) -> DateTime<Utc>;
}

/// Response to a caller action plus the successor handler, if any
#[derive(Debug)]
pub struct Outcome {
    pub response: String,
    pub next: Option<StateHandler>,
}

impl Outcome {
    fn stay(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            next: None,
        }
    }

    fn transition(response: impl Into<String>, next: StateHandler) -> Self {
        Self {
            response: response.into(),
            next: Some(next),
        }
    }
}

/// Payload of the `pending` state; owns the completion timer
#[derive(Debug)]
pub struct PendingBooking {
    id: BookingId,
    pending_since: DateTime<Utc>,
    timer: TimerHandle,
}

impl PendingBooking {
    /// Enter `pending` for `id`, starting its completion timer
    pub fn start(id: BookingId, services: &dyn StateServices) -> Self {
        let timer = services.schedule_completion(&id);
        Self {
            id,
            pending_since: services.now(),
            timer,
        }
    }

    pub fn id(&self) -> &BookingId {
        &self.id
    }

    pub fn pending_since(&self) -> DateTime<Utc> {
        self.pending_since
    }

    pub fn timer_status(&self) -> TimerStatus {
        self.timer.status()
    }
}

/// The workflow's active behaviour
#[derive(Debug)]
pub enum StateHandler {
    Open,
    Pending(PendingBooking),
    Booked { id: BookingId },
    Cancelled { id: BookingId },
}

impl StateHandler {
    pub fn state(&self) -> BookingState {
        match self {
            Self::Open => BookingState::Open,
            Self::Pending(_) => BookingState::Pending,
            Self::Booked { .. } => BookingState::Booked,
            Self::Cancelled { .. } => BookingState::Cancelled,
        }
    }

    pub fn booking_id(&self) -> Option<&BookingId> {
        match self {
            Self::Open => None,
            Self::Pending(pending) => Some(pending.id()),
            Self::Booked { id } | Self::Cancelled { id } => Some(id),
        }
    }

    pub fn book(&self, services: &dyn StateServices) -> Outcome {
        match self {
            Self::Open => {
                let id = services.next_id();
                let response = messages::booked(&id);
                Outcome::transition(
                    response,
                    Self::Pending(PendingBooking::start(id, services)),
                )
            }
            Self::Pending(_) => Outcome::stay(messages::PROCESSING),
            Self::Booked { id } => Outcome::stay(messages::already_booked(id)),
            Self::Cancelled { id } => {
                let response = messages::rebooked(id);
                Outcome::transition(
                    response,
                    Self::Pending(PendingBooking::start(id.clone(), services)),
                )
            }
        }
    }

    pub fn cancel(&self, _services: &dyn StateServices) -> Outcome {
        match self {
            Self::Open => Outcome::stay(messages::NOTHING_BOOKED),
            // The in-flight booking keeps running; its timer is untouched.
            Self::Pending(_) => Outcome::stay(messages::PROCESSING),
            Self::Booked { id } => {
                Outcome::transition(messages::CANCELLED, Self::Cancelled { id: id.clone() })
            }
            Self::Cancelled { .. } => Outcome::stay(messages::ALREADY_CANCELLED),
        }
    }

    /// Route a caller event to `book` / `cancel`
    pub fn handle(&self, event: BookingEvent, services: &dyn StateServices) -> Outcome {
        match event {
            BookingEvent::Book => self.book(services),
            BookingEvent::Cancel => self.cancel(services),
            BookingEvent::Complete => Outcome::stay(messages::COMPLETION_NOT_CALLER_DRIVEN),
        }
    }

    /// Release resources held by a handler that is being replaced.
    ///
    /// Returns `true` if a still-scheduled completion timer was cancelled.
    pub(crate) fn retire(&self) -> bool {
        match self {
            Self::Pending(pending) => pending.timer.cancel(),
            _ => false,
        }
    }
}

/// The workflow's transition table.
///
/// Returns the state the workflow occupies after `event` is processed in `from`;
/// an unchanged state means the event is answered without a transition.
pub fn determine_target_state(
    from: BookingState,
    event: BookingEvent,
) -> StateMachineResult<BookingState> {
    let target = match (from, event) {
        (BookingState::Open, BookingEvent::Book) => BookingState::Pending,
        (BookingState::Open, BookingEvent::Cancel) => BookingState::Open,

        (BookingState::Pending, BookingEvent::Book | BookingEvent::Cancel) => {
            BookingState::Pending
        }
        (BookingState::Pending, BookingEvent::Complete) => BookingState::Booked,

        (BookingState::Booked, BookingEvent::Book) => BookingState::Booked,
        (BookingState::Booked, BookingEvent::Cancel) => BookingState::Cancelled,

        (BookingState::Cancelled, BookingEvent::Book) => BookingState::Pending,
        (BookingState::Cancelled, BookingEvent::Cancel) => BookingState::Cancelled,

        (from, BookingEvent::Complete) => {
            return Err(StateMachineError::InvalidTransition { from, event })
        }
    };

    Ok(target)
}

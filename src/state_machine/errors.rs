use super::events::BookingEvent;
use super::states::BookingState;
use thiserror::Error;

/// Error types for state machine bookkeeping.
///
/// None of these reach `request_action` / `request_cancel` callers; illegal
/// actions are answered with an explanatory response instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Invalid state transition: event {event} is not accepted in state {from}")]
    InvalidTransition {
        from: BookingState,
        event: BookingEvent,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Stale completion: timer targets generation {expected}, workflow is at generation {actual}")]
    StaleCompletion { expected: u64, actual: u64 },

    #[error("Transition {from} -> {to} is not allowed for event {event}")]
    TransitionNotAllowed {
        from: BookingState,
        to: BookingState,
        event: BookingEvent,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Action '{action}' failed: {reason}")]
    ExecutionFailed { action: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Invalid transition data: {field}")]
    InvalidTransitionData { field: String },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
pub type GuardResult<T> = Result<T, GuardError>;
pub type ActionResult<T> = Result<T, ActionError>;
pub type PersistenceResult<T> = Result<T, PersistenceError>;

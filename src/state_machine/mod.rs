// State machine module for the booking workflow
//
// A context object delegates every caller action to the active state handler and
// installs the successor each handler produces. The `pending` handler also owns a
// deferred completion that moves the workflow to `booked` on its own.

pub mod actions;
pub mod context;
pub mod errors;
pub mod events;
pub mod guards;
pub mod handlers;
pub mod persistence;
pub mod states;

// Re-export main types for convenient access
pub use context::{
    ActionOutcome, AppliedTransition, StateSnapshot, WorkflowContext, WorkflowContextBuilder,
};
pub use errors::{ActionError, GuardError, PersistenceError, StateMachineError};
pub use events::BookingEvent;
pub use handlers::{determine_target_state, Outcome, PendingBooking, StateHandler, StateServices};
pub use states::BookingState;

// Common traits and utilities
pub use actions::StateAction;
pub use guards::StateGuard;
pub use persistence::{InMemoryTransitionPersistence, TransitionPersistence, TransitionRecord};

use super::context::AppliedTransition;
use super::errors::ActionResult;
use super::states::BookingState;
use crate::constants::events;
use crate::events::publisher::{EventPublisher, TransitionEvent};
use crate::logging::log_booking_operation;

/// Side effect run after every installed transition.
///
/// Actions run in install order once the workflow's state slot is released, so
/// they may read the workflow or issue further actions. A failing action is
/// logged and does not undo the transition.
pub trait StateAction: Send + Sync {
    /// Execute the action
    fn execute(&self, transition: &AppliedTransition) -> ActionResult<()>;

    /// Get a description of this action for logging
    fn description(&self) -> &'static str;
}

/// Action to emit a structured log line for the transition
pub struct LogTransitionAction;

impl StateAction for LogTransitionAction {
    fn execute(&self, transition: &AppliedTransition) -> ActionResult<()> {
        log_booking_operation(
            transition.event.event_type(),
            transition.booking_id.as_ref().map(|id| id.as_str()),
            &transition.from.to_string(),
            &transition.to.to_string(),
            transition.generation,
            determine_event_name(transition.from, transition.to),
        );
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Log transition"
    }
}

/// Action to publish lifecycle events when state transitions occur
pub struct PublishTransitionEventAction {
    event_publisher: EventPublisher,
}

impl PublishTransitionEventAction {
    pub fn new(event_publisher: EventPublisher) -> Self {
        Self { event_publisher }
    }
}

impl StateAction for PublishTransitionEventAction {
    fn execute(&self, transition: &AppliedTransition) -> ActionResult<()> {
        if let Some(name) = determine_event_name(transition.from, transition.to) {
            self.event_publisher.publish(TransitionEvent {
                name: name.to_string(),
                booking_id: transition.booking_id.clone(),
                from: transition.from,
                to: transition.to,
                generation: transition.generation,
                occurred_at: transition.occurred_at,
            });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Publish lifecycle event for booking transition"
    }
}

/// Lifecycle event name for a transition, if it has one
pub fn determine_event_name(from: BookingState, to: BookingState) -> Option<&'static str> {
    match (from, to) {
        (BookingState::Open, BookingState::Pending) => Some(events::BOOKING_REQUESTED),
        (BookingState::Pending, BookingState::Booked) => Some(events::BOOKING_CONFIRMED),
        (BookingState::Booked, BookingState::Cancelled) => Some(events::BOOKING_CANCELLED),
        (BookingState::Cancelled, BookingState::Pending) => Some(events::BOOKING_REBOOKED),
        _ => None,
    }
}

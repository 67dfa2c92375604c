use crate::identifiers::BookingId;
use crate::state_machine::states::BookingState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity for transition events
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out publisher for workflow transition events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<TransitionEvent>,
}

/// A single installed transition, as seen by subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub name: String,
    pub booking_id: Option<BookingId>,
    pub from: BookingState,
    pub to: BookingState,
    pub generation: u64,
    pub occurred_at: DateTime<Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it.
    ///
    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: TransitionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

//! # Workflow Constants
//!
//! Event names published on every installed transition and the caller-facing
//! response texts produced by each state.

/// Lifecycle events published when the workflow installs a new state
pub mod events {
    pub const BOOKING_REQUESTED: &str = "booking.requested";
    pub const BOOKING_CONFIRMED: &str = "booking.confirmed";
    pub const BOOKING_CANCELLED: &str = "booking.cancelled";
    pub const BOOKING_REBOOKED: &str = "booking.rebooked";
}

/// Response texts returned from `request_action` / `request_cancel`
pub mod messages {
    use crate::identifiers::BookingId;

    pub const PROCESSING: &str = "Please wait... your booking is still being processed";
    pub const NOTHING_BOOKED: &str = "Nothing to cancel: no event has been booked yet";
    pub const CANCELLED: &str = "Event cancelled";
    pub const ALREADY_CANCELLED: &str = "Event is already cancelled";
    pub const COMPLETION_NOT_CALLER_DRIVEN: &str =
        "Booking completion happens automatically and cannot be requested";

    pub fn booked(id: &BookingId) -> String {
        format!("Event booked with id: {id}")
    }

    pub fn already_booked(id: &BookingId) -> String {
        format!("Event is already booked with id: {id}")
    }

    pub fn rebooked(id: &BookingId) -> String {
        format!("Rebooked using old ID: {id}")
    }
}

/// Default deferred-completion delay in milliseconds
pub const DEFAULT_COMPLETION_DELAY_MS: u64 = 3_000;

/// Upper bound accepted for the deferred-completion delay (one day)
pub const MAX_COMPLETION_DELAY_MS: u64 = 86_400_000;

#[cfg(test)]
mod tests {
    use super::messages;
    use crate::identifiers::BookingId;

    #[test]
    fn test_messages_embed_booking_id() {
        let id = BookingId::from("X");
        assert_eq!(messages::booked(&id), "Event booked with id: X");
        assert_eq!(messages::rebooked(&id), "Rebooked using old ID: X");
        assert!(messages::already_booked(&id).ends_with(": X"));
        assert!(messages::PROCESSING.starts_with("Please wait..."));
    }
}

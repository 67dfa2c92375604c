use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable tag of the workflow's active state handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    /// Initial state; nothing has been booked
    #[default]
    Open,
    /// A booking is in flight and will complete once its timer fires
    Pending,
    /// The booking has been confirmed
    Booked,
    /// The booking was cancelled; it may be rebooked under the same id
    Cancelled,
}

impl BookingState {
    /// A booking is being processed and ignores caller actions
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// A booking id is attached to this state
    pub fn has_booking(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Pending => write!(f, "pending"),
            Self::Booked => write!(f, "booked"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for BookingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "booked" => Ok(Self::Booked),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid booking state: {s}")),
        }
    }
}

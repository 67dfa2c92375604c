use super::errors::{GuardError, GuardResult};
use super::events::BookingEvent;
use super::handlers::determine_target_state;
use super::states::BookingState;

/// Trait for implementing state transition guards
pub trait StateGuard<T: ?Sized> {
    /// Check if a transition is allowed
    fn check(&self, subject: &T) -> GuardResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Position of the workflow at the moment a guard is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateIdentity {
    pub state: BookingState,
    pub generation: u64,
}

/// Identity guard for deferred completions.
///
/// A completion timer captures the generation of the `pending` handler that
/// scheduled it. It may only apply while that exact handler is still active.
#[derive(Debug, Clone, Copy)]
pub struct CurrentStateGuard {
    expected_generation: u64,
}

impl CurrentStateGuard {
    pub fn new(expected_generation: u64) -> Self {
        Self {
            expected_generation,
        }
    }
}

impl StateGuard<StateIdentity> for CurrentStateGuard {
    fn check(&self, current: &StateIdentity) -> GuardResult<()> {
        if current.generation != self.expected_generation
            || current.state != BookingState::Pending
        {
            return Err(GuardError::StaleCompletion {
                expected: self.expected_generation,
                actual: current.generation,
            });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Completion must target the active pending handler"
    }
}

/// Guard checking a proposed successor against the transition table
#[derive(Debug, Clone, Copy)]
pub struct TransitionAllowedGuard {
    event: BookingEvent,
    to: BookingState,
}

impl TransitionAllowedGuard {
    pub fn new(event: BookingEvent, to: BookingState) -> Self {
        Self { event, to }
    }
}

impl StateGuard<BookingState> for TransitionAllowedGuard {
    fn check(&self, from: &BookingState) -> GuardResult<()> {
        match determine_target_state(*from, self.event) {
            Ok(target) if target == self.to && target != *from => Ok(()),
            _ => Err(GuardError::TransitionNotAllowed {
                from: *from,
                to: self.to,
                event: self.event,
            }),
        }
    }

    fn description(&self) -> &'static str {
        "Successor must match the transition table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_state_guard_accepts_matching_pending() {
        let guard = CurrentStateGuard::new(3);
        let current = StateIdentity {
            state: BookingState::Pending,
            generation: 3,
        };
        assert!(guard.check(&current).is_ok());
    }

    #[test]
    fn test_current_state_guard_rejects_newer_generation() {
        let guard = CurrentStateGuard::new(1);
        let current = StateIdentity {
            state: BookingState::Pending,
            generation: 3,
        };
        assert_eq!(
            guard.check(&current).unwrap_err(),
            GuardError::StaleCompletion {
                expected: 1,
                actual: 3
            }
        );
    }

    #[test]
    fn test_current_state_guard_rejects_non_pending() {
        let guard = CurrentStateGuard::new(2);
        let current = StateIdentity {
            state: BookingState::Cancelled,
            generation: 2,
        };
        assert!(guard.check(&current).is_err());
    }

    #[test]
    fn test_transition_allowed_guard() {
        let guard = TransitionAllowedGuard::new(BookingEvent::Cancel, BookingState::Cancelled);
        assert!(guard.check(&BookingState::Booked).is_ok());
        assert!(guard.check(&BookingState::Pending).is_err());

        let stay = TransitionAllowedGuard::new(BookingEvent::Cancel, BookingState::Open);
        assert!(stay.check(&BookingState::Open).is_err());
    }
}

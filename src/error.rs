use crate::config::ConfigurationError;
use crate::scheduler::SchedulerError;
use thiserror::Error;

/// Root error type for the booking workflow.
///
/// Business-rule rejections (double booking, cancelling nothing, ...) are never
/// represented here; they are ordinary responses from the active state.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;

#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Booking Workflow
//!
//! A booking lifecycle built on the state pattern: a [`WorkflowContext`] delegates
//! every caller action to the currently active state handler, and one transition
//! (`pending -> booked`) completes on its own after a configurable delay.
//!
//! ## State Machine
//!
//! | State     | `request_action`        | `request_cancel`        |
//! |-----------|-------------------------|-------------------------|
//! | open      | -> pending (new id)     | stay, nothing booked    |
//! | pending   | stay, please wait       | stay, please wait       |
//! | booked    | stay, already booked    | -> cancelled            |
//! | cancelled | -> pending (same id)    | stay, already cancelled |
//!
//! A `pending` workflow moves to `booked` once its completion timer fires. There
//! is no terminal state; a cancelled booking can be rebooked under its old id.
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Context, state handlers, guards, actions and history
//! - [`scheduler`] - Injected timer scheduling (tokio-backed and virtual clock)
//! - [`identifiers`] - Booking ids and injectable generators
//! - [`config`] - Layered configuration
//! - [`events`] - Transition event fan-out
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate error types
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use booking_workflow::{BookingState, WorkflowContext, WorkflowConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = WorkflowContext::new(WorkflowConfig::default())?;
//!
//! let response = workflow.request_action();
//! assert!(response.starts_with("Event booked with id:"));
//! assert_eq!(workflow.current_state(), BookingState::Pending);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Timing is driven by the injected scheduler, so tests never wait on real delays:
//! use [`scheduler::ManualScheduler`] or `#[tokio::test(start_paused = true)]`.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod identifiers;
pub mod logging;
pub mod scheduler;
pub mod state_machine;

pub use config::{BookingConfig, ConfigManager, LoggingConfig, WorkflowConfig};
pub use error::{BookingError, BookingResult};
pub use events::{EventPublisher, TransitionEvent};
pub use identifiers::{BookingId, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TimerStatus, TokioScheduler};
pub use state_machine::{
    ActionOutcome, BookingEvent, BookingState, StateSnapshot, WorkflowContext,
    WorkflowContextBuilder,
};

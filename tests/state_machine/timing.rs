//! Deferred completion on a paused tokio clock.

use booking_workflow::constants::events;
use booking_workflow::{
    BookingState, SequentialIdGenerator, TimerStatus, WorkflowConfig, WorkflowContext,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

const DELAY: Duration = Duration::from_millis(1500);

fn tokio_workflow() -> WorkflowContext {
    assert_ok!(WorkflowContext::builder()
        .completion_delay(DELAY)
        .id_generator(Arc::new(SequentialIdGenerator::new("evt")))
        .build())
}

#[tokio::test(start_paused = true)]
async fn test_completion_fires_after_configured_delay() {
    let workflow = tokio_workflow();
    workflow.request_action();
    assert_eq!(workflow.completion_timer(), Some(TimerStatus::Scheduled));

    tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
    assert_eq!(workflow.current_state(), BookingState::Pending);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(workflow.current_state(), BookingState::Booked);
    assert_eq!(workflow.completion_timer(), None);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_observe_confirmation() {
    let workflow = tokio_workflow();
    let mut receiver = workflow.subscribe();

    workflow.request_action();
    let requested = receiver.recv().await.unwrap();
    assert_eq!(requested.name, events::BOOKING_REQUESTED);
    assert_eq!(requested.to, BookingState::Pending);

    // Nothing else is runnable, so the paused clock jumps straight to the timer.
    let confirmed = receiver.recv().await.unwrap();
    assert_eq!(confirmed.name, events::BOOKING_CONFIRMED);
    assert_eq!(confirmed.from, BookingState::Pending);
    assert_eq!(confirmed.to, BookingState::Booked);
    assert_eq!(confirmed.booking_id, requested.booking_id);
    assert_eq!(confirmed.generation, requested.generation + 1);
}

#[tokio::test(start_paused = true)]
async fn test_rebook_restarts_full_delay() {
    let workflow = tokio_workflow();
    workflow.request_action();
    tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
    assert_eq!(workflow.current_state(), BookingState::Booked);

    workflow.request_cancel();
    workflow.request_action();

    tokio::time::sleep(DELAY / 2).await;
    assert_eq!(workflow.current_state(), BookingState::Pending);

    tokio::time::sleep(DELAY).await;
    assert_eq!(workflow.current_state(), BookingState::Booked);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_workflow_timer_is_inert() {
    let workflow = tokio_workflow();
    let mut receiver = workflow.subscribe();
    workflow.request_action();
    assert_eq!(
        receiver.recv().await.unwrap().name,
        events::BOOKING_REQUESTED
    );

    drop(workflow);
    tokio::time::sleep(DELAY * 2).await;

    // The publisher went away with the workflow; no confirmation was ever sent.
    assert!(receiver.recv().await.is_err());
}

#[tokio::test]
async fn test_new_uses_configured_delay() {
    let workflow = assert_ok!(WorkflowContext::new(WorkflowConfig {
        completion_delay_ms: 250,
    }));
    assert_eq!(workflow.completion_delay(), Duration::from_millis(250));
    assert_eq!(workflow.current_state(), BookingState::Open);
}

#[test]
fn test_default_scheduler_requires_runtime() {
    let result = WorkflowContext::new(WorkflowConfig::default());
    assert!(matches!(
        result,
        Err(booking_workflow::BookingError::Scheduler(_))
    ));
}

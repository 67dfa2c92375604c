//! End-to-end booking scenarios on a virtual clock.

use crate::common::{ManualWorkflow, TEST_DELAY};
use booking_workflow::constants::messages;
use booking_workflow::{BookingEvent, BookingId, BookingState};
use std::time::Duration;

#[test]
fn test_book_from_open_enters_pending() {
    let harness = ManualWorkflow::new();

    assert_eq!(
        harness.workflow.request_action(),
        "Event booked with id: evt-1"
    );
    let snapshot = harness.workflow.snapshot();
    assert_eq!(snapshot.state, BookingState::Pending);
    assert_eq!(snapshot.booking_id, Some(BookingId::from("evt-1")));
    assert!(snapshot.pending_since.is_some());
}

#[test]
fn test_book_again_while_pending_asks_to_wait() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();
    let before = harness.workflow.snapshot();

    let response = harness.workflow.request_action();
    assert!(response.starts_with("Please wait..."));
    assert_eq!(harness.workflow.snapshot(), before);
}

#[test]
fn test_pending_completes_after_delay_without_caller() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();

    harness.elapse(TEST_DELAY - Duration::from_millis(1));
    assert_eq!(harness.workflow.current_state(), BookingState::Pending);

    assert_eq!(harness.elapse(Duration::from_millis(1)), 1);
    assert_eq!(harness.workflow.current_state(), BookingState::Booked);
    assert_eq!(harness.workflow.booking_id(), Some(BookingId::from("evt-1")));
}

#[test]
fn test_cancel_then_rebook_reuses_id() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();
    harness.elapse(TEST_DELAY);

    assert_eq!(harness.workflow.request_cancel(), "Event cancelled");
    assert_eq!(harness.workflow.current_state(), BookingState::Cancelled);
    assert_eq!(harness.workflow.booking_id(), Some(BookingId::from("evt-1")));

    assert_eq!(
        harness.workflow.request_action(),
        "Rebooked using old ID: evt-1"
    );
    assert_eq!(harness.workflow.current_state(), BookingState::Pending);

    harness.elapse(TEST_DELAY);
    assert_eq!(harness.workflow.current_state(), BookingState::Booked);
    assert_eq!(harness.workflow.booking_id(), Some(BookingId::from("evt-1")));
    assert_eq!(harness.ids.issued(), 1);
}

#[test]
fn test_cancel_twice_from_booked() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();
    harness.elapse(TEST_DELAY);

    let first = harness.workflow.dispatch(BookingEvent::Cancel);
    assert!(first.transitioned);
    assert_eq!(first.to, BookingState::Cancelled);

    let second = harness.workflow.dispatch(BookingEvent::Cancel);
    assert_eq!(second.response, messages::ALREADY_CANCELLED);
    assert!(!second.transitioned);
    assert_eq!(harness.workflow.current_state(), BookingState::Cancelled);
}

#[test]
fn test_cancel_from_open_reports_nothing_booked() {
    let harness = ManualWorkflow::new();

    assert_eq!(harness.workflow.request_cancel(), messages::NOTHING_BOOKED);
    assert_eq!(harness.workflow.current_state(), BookingState::Open);
    assert_eq!(harness.workflow.snapshot().generation, 0);
    assert!(harness.workflow.history().is_empty());
}

#[test]
fn test_book_when_booked_reports_already_booked() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();
    harness.elapse(TEST_DELAY);

    assert_eq!(
        harness.workflow.request_action(),
        "Event is already booked with id: evt-1"
    );
    assert_eq!(harness.workflow.current_state(), BookingState::Booked);
}

#[test]
fn test_repeated_book_while_pending_does_not_extend_timer() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();

    harness.elapse(Duration::from_secs(2));
    harness.workflow.request_action();
    harness.workflow.request_action();
    assert_eq!(harness.scheduler.pending(), 1);

    harness.elapse(Duration::from_secs(1));
    assert_eq!(harness.workflow.current_state(), BookingState::Booked);
}

#[test]
fn test_cancel_while_pending_leaves_timer_running() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();

    assert_eq!(harness.workflow.request_cancel(), messages::PROCESSING);
    assert_eq!(harness.workflow.current_state(), BookingState::Pending);
    assert_eq!(harness.scheduler.pending(), 1);

    harness.elapse(TEST_DELAY);
    assert_eq!(harness.workflow.current_state(), BookingState::Booked);
}

#[test]
fn test_history_records_every_transition() {
    let harness = ManualWorkflow::new();
    harness.workflow.request_action();
    harness.elapse(TEST_DELAY);
    harness.workflow.request_cancel();
    harness.workflow.request_cancel();
    harness.workflow.request_action();

    let history = harness.workflow.history();
    let path: Vec<(BookingState, BookingState, BookingEvent)> = history
        .iter()
        .map(|r| (r.from_state, r.to_state, r.event))
        .collect();
    assert_eq!(
        path,
        vec![
            (BookingState::Open, BookingState::Pending, BookingEvent::Book),
            (BookingState::Pending, BookingState::Booked, BookingEvent::Complete),
            (BookingState::Booked, BookingState::Cancelled, BookingEvent::Cancel),
            (BookingState::Cancelled, BookingState::Pending, BookingEvent::Book),
        ]
    );
    assert!(history
        .iter()
        .all(|r| r.booking_id == Some(BookingId::from("evt-1"))));
    assert_eq!(
        history.iter().map(|r| r.generation).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(history.iter().filter(|r| r.most_recent).count(), 1);
    assert_eq!(harness.workflow.snapshot().generation, 4);
}

#[test]
fn test_clones_share_one_workflow() {
    let harness = ManualWorkflow::new();
    let other = harness.workflow.clone();

    other.request_action();
    assert_eq!(harness.workflow.current_state(), BookingState::Pending);

    harness.elapse(TEST_DELAY);
    assert_eq!(other.current_state(), BookingState::Booked);
}

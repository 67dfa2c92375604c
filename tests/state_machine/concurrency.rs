//! Caller actions racing real completion timers on a multi-threaded runtime.

use booking_workflow::{BookingId, BookingState, SequentialIdGenerator, WorkflowContext};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transitions_stay_consistent_under_contention() {
    let workflow = WorkflowContext::builder()
        .completion_delay(Duration::from_millis(1))
        .id_generator(Arc::new(SequentialIdGenerator::new("evt")))
        .build()
        .unwrap();

    let mut callers = Vec::new();
    for worker in 0..4 {
        let workflow = workflow.clone();
        callers.push(tokio::spawn(async move {
            for round in 0..200 {
                if (worker + round) % 2 == 0 {
                    workflow.request_action();
                } else {
                    workflow.request_cancel();
                }
                if round % 10 == 0 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            }
        }));
    }
    for caller in callers {
        caller.await.unwrap();
    }

    // Let any in-flight booking settle.
    for _ in 0..100 {
        if workflow.current_state() != BookingState::Pending {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let history = workflow.history();
    assert!(!history.is_empty());
    assert_eq!(history[0].from_state, BookingState::Open);
    for pair in history.windows(2) {
        assert_eq!(pair[0].to_state, pair[1].from_state);
        assert_eq!(pair[0].generation + 1, pair[1].generation);
    }
    assert!(history
        .iter()
        .all(|r| r.booking_id == Some(BookingId::from("evt-1"))));

    let snapshot = workflow.snapshot();
    assert_eq!(snapshot.generation, history.len() as u64);
    assert_eq!(Some(snapshot.state), history.last().map(|r| r.to_state));
    assert_ne!(snapshot.state, BookingState::Open);
}

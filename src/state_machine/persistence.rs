use super::context::AppliedTransition;
use super::errors::{PersistenceError, PersistenceResult};
use super::events::BookingEvent;
use super::states::BookingState;
use crate::identifiers::BookingId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Stored form of one installed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub sort_key: u64,
    pub booking_id: Option<BookingId>,
    pub from_state: BookingState,
    pub to_state: BookingState,
    pub event: BookingEvent,
    pub generation: u64,
    pub most_recent: bool,
    pub transitioned_at: DateTime<Utc>,
}

/// Trait for persisting state transitions
pub trait TransitionPersistence: Send + Sync {
    /// Persist a state transition, returning the stored record
    fn persist_transition(
        &self,
        transition: &AppliedTransition,
    ) -> PersistenceResult<TransitionRecord>;

    /// Retained transitions in sort-key order
    fn history(&self) -> Vec<TransitionRecord>;
}

#[derive(Debug, Default)]
struct Records {
    entries: VecDeque<TransitionRecord>,
    next_sort_key: u64,
}

/// Process-local transition log.
///
/// Unbounded by default; [`InMemoryTransitionPersistence::with_retention`] keeps
/// only the newest records. Sort keys keep counting across evictions.
#[derive(Debug, Default)]
pub struct InMemoryTransitionPersistence {
    records: Mutex<Records>,
    retention: Option<usize>,
}

impl InMemoryTransitionPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` records, evicting the oldest first
    pub fn with_retention(limit: usize) -> Self {
        Self {
            records: Mutex::default(),
            retention: Some(limit.max(1)),
        }
    }
}

impl TransitionPersistence for InMemoryTransitionPersistence {
    fn persist_transition(
        &self,
        transition: &AppliedTransition,
    ) -> PersistenceResult<TransitionRecord> {
        if transition.from == transition.to {
            return Err(PersistenceError::InvalidTransitionData {
                field: "to_state".to_string(),
            });
        }

        let mut records = self.records.lock();
        // Only the newest record can carry the flag.
        if let Some(previous) = records.entries.back_mut() {
            previous.most_recent = false;
        }

        records.next_sort_key += 1;
        let record = TransitionRecord {
            sort_key: records.next_sort_key,
            booking_id: transition.booking_id.clone(),
            from_state: transition.from,
            to_state: transition.to,
            event: transition.event,
            generation: transition.generation,
            most_recent: true,
            transitioned_at: transition.occurred_at,
        };
        records.entries.push_back(record.clone());

        if let Some(limit) = self.retention {
            while records.entries.len() > limit {
                records.entries.pop_front();
            }
        }

        Ok(record)
    }

    fn history(&self) -> Vec<TransitionRecord> {
        self.records.lock().entries.iter().cloned().collect()
    }
}

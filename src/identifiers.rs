//! # Booking Identifiers
//!
//! Opaque identifiers naming a single booking attempt, plus the injectable
//! generators that mint them. A fresh id is only ever requested when an `open`
//! workflow starts a new booking; rebooking after cancellation reuses the id
//! carried by the cancelled state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Opaque, immutable booking identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookingId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BookingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Source of new booking identifiers
pub trait IdGenerator: Send + Sync {
    /// Allocate a new, never-before-returned identifier
    fn next_id(&self) -> BookingId;
}

/// Random v4 UUID identifiers; the production default
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> BookingId {
        BookingId(Uuid::new_v4().to_string())
    }
}

/// Deterministic identifiers `"<prefix>-1"`, `"<prefix>-2"`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Number of identifiers handed out so far
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("booking")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> BookingId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        BookingId(format!("{}-{n}", self.prefix))
    }
}

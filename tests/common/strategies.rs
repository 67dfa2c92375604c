//! Proptest strategies for random caller / clock interleavings.

use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Book,
    Cancel,
    Advance(u64),
}

pub fn step_strategy(max_advance_ms: u64) -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Book),
        3 => Just(Step::Cancel),
        2 => (0..=max_advance_ms).prop_map(Step::Advance),
    ]
}

pub fn steps_strategy(max_advance_ms: u64) -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(step_strategy(max_advance_ms), 0..40)
}

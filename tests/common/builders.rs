//! Workflow builders shared by the integration tests.

use booking_workflow::{ManualScheduler, SequentialIdGenerator, WorkflowContext};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_DELAY: Duration = Duration::from_secs(3);

/// A workflow on a virtual clock with ids `evt-1`, `evt-2`, ...
pub struct ManualWorkflow {
    pub workflow: WorkflowContext,
    pub scheduler: Arc<ManualScheduler>,
    pub ids: Arc<SequentialIdGenerator>,
}

impl ManualWorkflow {
    pub fn new() -> Self {
        Self::with_delay(TEST_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        let scheduler = ManualScheduler::new();
        let ids = Arc::new(SequentialIdGenerator::new("evt"));
        let workflow = WorkflowContext::builder()
            .completion_delay(delay)
            .scheduler(scheduler.clone())
            .id_generator(ids.clone())
            .build()
            .expect("manual workflow should build");

        Self {
            workflow,
            scheduler,
            ids,
        }
    }

    /// Let the pending completion fire
    pub fn elapse(&self, by: Duration) -> usize {
        self.scheduler.advance(by)
    }
}

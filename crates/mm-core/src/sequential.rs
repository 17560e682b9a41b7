use crate::executor::{Executor, LeafTask, TaskOutcome};

/// Runs leaf tasks one after another on the calling thread, in spawn order.
///
/// Deterministic, so tests can reason about task order and failures
/// without a thread pool.
#[derive(Debug, Clone, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        SequentialExecutor
    }
}

impl Executor for SequentialExecutor {
    fn name(&self) -> &str {
        "sequential"
    }

    fn run_all<'scope>(&self, tasks: Vec<LeafTask<'scope>>) -> Vec<TaskOutcome> {
        tasks.into_iter().map(LeafTask::run).collect()
    }
}

use std::any::Any;
use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};

use tracing::{trace, warn};

use crate::error::{LeafFailure, MatrixError, Result};
use crate::view::Region;

/// Outcome of one leaf task.
pub type TaskOutcome = std::result::Result<(), LeafFailure>;

/// The smallest unit of work a strategy hands to an executor.
///
/// Carries the result region the work writes, so executors can log or
/// record write sets without running anything.
pub struct LeafTask<'scope> {
    region: Region,
    work: Box<dyn FnOnce() + Send + 'scope>,
}

impl<'scope> LeafTask<'scope> {
    pub fn new<F>(region: Region, work: F) -> Self
    where
        F: FnOnce() + Send + 'scope,
    {
        LeafTask {
            region,
            work: Box::new(work),
        }
    }

    /// The result cells this task writes.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Runs the task on the current thread.
    ///
    /// A panic inside the task (typically from an algebra callback) is
    /// caught and returned as a `LeafFailure`, so one failing task never
    /// takes the others down with it.
    pub fn run(self) -> TaskOutcome {
        let LeafTask { region, work } = self;
        panic::catch_unwind(AssertUnwindSafe(work)).map_err(|payload| LeafFailure {
            region,
            message: panic_message(payload.as_ref()),
        })
    }
}

impl Debug for LeafTask<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafTask")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "leaf task panicked".to_string()
    }
}

/// Trait for pluggable task runtimes (sequential, rayon, instrumented, ...).
///
/// An executor receives every leaf task of one multiplication at once and
/// must not return until each of them has run to completion or failed.
/// Tasks write disjoint cells, so they may run in any order and on any
/// threads.
pub trait Executor: Send + Sync + Debug {
    /// Returns the name of this executor (e.g., "sequential", "rayon").
    fn name(&self) -> &str;

    /// Runs every task and returns one outcome per task, in task order.
    fn run_all<'scope>(&self, tasks: Vec<LeafTask<'scope>>) -> Vec<TaskOutcome>;
}

/// Leaf tasks spawned by one multiplication, waiting on a common join.
///
/// Strategies thread a `&mut TaskGroup` through their decomposition and call
/// [`spawn`](Self::spawn) for each leaf; the entry point then blocks in
/// [`join`](Self::join).
#[derive(Debug, Default)]
pub struct TaskGroup<'scope> {
    tasks: Vec<LeafTask<'scope>>,
}

impl<'scope> TaskGroup<'scope> {
    pub fn new() -> Self {
        TaskGroup { tasks: Vec::new() }
    }

    /// Adds a leaf task writing `region`.
    pub fn spawn<F>(&mut self, region: Region, work: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        self.tasks.push(LeafTask::new(region, work));
    }

    /// Number of tasks spawned so far.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Hands every spawned task to `executor` and waits for all of them.
    ///
    /// Returns the number of tasks run. If any task failed, the error lists
    /// every failure, not only the first.
    pub fn join(self, executor: &dyn Executor) -> Result<usize> {
        let total = self.tasks.len();
        if total == 0 {
            return Ok(0);
        }
        trace!(tasks = total, executor = executor.name(), "joining leaf tasks");

        let failures: Vec<LeafFailure> = executor
            .run_all(self.tasks)
            .into_iter()
            .filter_map(|outcome| outcome.err())
            .collect();
        if failures.is_empty() {
            return Ok(total);
        }

        warn!(failed = failures.len(), total, "leaf tasks failed");
        Err(MatrixError::TaskFailure {
            failed: failures.len(),
            total,
            failures,
        })
    }
}

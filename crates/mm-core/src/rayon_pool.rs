use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::error::{MatrixError, Result};
use crate::executor::{Executor, LeafTask, TaskOutcome};

/// Runs leaf tasks on a rayon thread pool.
///
/// Either owns a dedicated pool or, via [`RayonExecutor::global`], uses
/// rayon's global pool.
#[derive(Debug)]
pub struct RayonExecutor {
    pool: Option<rayon::ThreadPool>,
}

impl RayonExecutor {
    /// Creates an executor with its own pool of `num_threads` workers.
    /// If `num_threads` is 0, rayon picks the count (`RAYON_NUM_THREADS`
    /// or the number of logical CPUs).
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("mm-leaf-{i}"))
            .build()
            .map_err(|err| MatrixError::ThreadPool(err.to_string()))?;
        Ok(RayonExecutor { pool: Some(pool) })
    }

    /// Uses rayon's global thread pool.
    pub fn global() -> Self {
        RayonExecutor { pool: None }
    }

    /// Number of worker threads tasks are spread over.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::global()
    }
}

impl Executor for RayonExecutor {
    fn name(&self) -> &str {
        "rayon"
    }

    fn run_all<'scope>(&self, tasks: Vec<LeafTask<'scope>>) -> Vec<TaskOutcome> {
        let run = move || {
            tasks
                .into_par_iter()
                .map(LeafTask::run)
                .collect::<Vec<TaskOutcome>>()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

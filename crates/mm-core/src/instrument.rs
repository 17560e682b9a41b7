use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

use crate::algebra::Element;
use crate::error::Result;
use crate::executor::{Executor, LeafTask, TaskOutcome};
use crate::matrix::Matrix;
use crate::strategy::Strategy;

/// An executor wrapper that counts the work passing through it.
///
/// Delegates every batch to `inner` unchanged, so it can wrap any executor
/// without affecting results.
#[derive(Debug)]
pub struct Instrumented<'e> {
    inner: &'e dyn Executor,
    tasks: AtomicUsize,
    batches: AtomicUsize,
}

impl<'e> Instrumented<'e> {
    pub fn new(inner: &'e dyn Executor) -> Self {
        Instrumented {
            inner,
            tasks: AtomicUsize::new(0),
            batches: AtomicUsize::new(0),
        }
    }

    /// Leaf tasks run so far.
    pub fn tasks(&self) -> usize {
        self.tasks.load(Ordering::Acquire)
    }

    /// Join batches run so far (one per multiplication that spawned work).
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::Acquire)
    }
}

impl Executor for Instrumented<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn run_all<'scope>(&self, tasks: Vec<LeafTask<'scope>>) -> Vec<TaskOutcome> {
        self.tasks.fetch_add(tasks.len(), Ordering::AcqRel);
        self.batches.fetch_add(1, Ordering::AcqRel);
        self.inner.run_all(tasks)
    }
}

/// Timing and task count of one multiplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplyReport {
    pub strategy: Strategy,
    pub executor: String,
    pub rows: usize,
    pub inner: usize,
    pub cols: usize,
    pub tasks: usize,
    pub elapsed: Duration,
}

impl fmt::Display for MultiplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {}: [{}x{}] x [{}x{}] in {:?} ({} tasks)",
            self.strategy,
            self.executor,
            self.rows,
            self.inner,
            self.inner,
            self.cols,
            self.elapsed,
            self.tasks
        )
    }
}

impl<T: Element> Matrix<T> {
    /// Runs [`Matrix::multiply`] and reports how long it took and how many
    /// leaf tasks it spawned.
    pub fn multiply_timed(
        &self,
        op: &Matrix<T>,
        strategy: Strategy,
        executor: &dyn Executor,
    ) -> Result<(Matrix<T>, MultiplyReport)> {
        let counting = Instrumented::new(executor);
        let start = Instant::now();
        let product = self.multiply(op, strategy, &counting)?;
        let elapsed = start.elapsed();

        let report = MultiplyReport {
            strategy,
            executor: executor.name().to_string(),
            rows: self.rows(),
            inner: self.cols(),
            cols: op.cols(),
            tasks: counting.tasks(),
            elapsed,
        };
        info!(
            strategy = %report.strategy,
            executor = %report.executor,
            tasks = report.tasks,
            elapsed_us = report.elapsed.as_micros() as u64,
            "multiplication finished"
        );
        Ok((product, report))
    }
}

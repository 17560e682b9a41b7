//! `mm-core` - Divide-and-conquer parallel matrix multiplication.
//!
//! This crate provides:
//! - A `Matrix` type owning a contiguous row-major buffer and an `Algebra`
//! - Zero-copy `MatrixView` / `MatrixViewMut` windows into that buffer
//! - An `Algebra` record (multiply, add, zero) so any semiring can be used
//! - An `Executor` trait for pluggable task runtimes (sequential, rayon)
//! - Three multiplication strategies: flat per-cell, recursive bisection to
//!   single cells, and recursive bisection to small blocks
//! - An `Instrumented` executor and `multiply_timed` for timing reports

pub mod algebra;
pub mod error;
pub mod executor;
pub mod instrument;
pub mod matrix;
#[cfg(feature = "rayon")]
pub mod rayon_pool;
pub mod sequential;
pub mod strategy;
pub mod view;

// Re-export primary types at the crate root for convenience.
pub use algebra::{Algebra, Element};
pub use error::{LeafFailure, MatrixError, Result};
pub use executor::{Executor, LeafTask, TaskGroup, TaskOutcome};
pub use instrument::{Instrumented, MultiplyReport};
pub use matrix::Matrix;
#[cfg(feature = "rayon")]
pub use rayon_pool::RayonExecutor;
pub use sequential::SequentialExecutor;
pub use strategy::{BlockSize, Strategy};
pub use view::{MatrixView, MatrixViewMut, Region};

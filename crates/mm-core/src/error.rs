use std::fmt;

use thiserror::Error;

use crate::view::Region;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("invalid dimensions {rows}x{cols}: {reason}")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        reason: String,
    },
    #[error("incompatible dimensions: [{m}x{k}] x [{k2}x{n}]")]
    IncompatibleDimensions {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("index ({row}, {col}) out of range for a {rows}x{cols} extent")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("invalid block size {rows}x{cols}: both sides must be at least 1")]
    InvalidBlockSize { rows: usize, cols: usize },
    #[error("{failed} of {total} leaf tasks failed: {}", join_failures(.failures))]
    TaskFailure {
        failed: usize,
        total: usize,
        failures: Vec<LeafFailure>,
    },
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;

fn join_failures(failures: &[LeafFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A leaf task that did not run to completion, with the result region it
/// was meant to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafFailure {
    pub region: Region,
    pub message: String,
}

impl fmt::Display for LeafFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaf {} panicked: {}", self.region, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_message() {
        let err = MatrixError::IncompatibleDimensions {
            m: 2,
            k: 3,
            k2: 4,
            n: 5,
        };
        assert_eq!(err.to_string(), "incompatible dimensions: [2x3] x [4x5]");
    }

    #[test]
    fn test_task_failure_lists_every_leaf() {
        let failures = vec![
            LeafFailure {
                region: Region::cell(0, 1),
                message: "boom".to_string(),
            },
            LeafFailure {
                region: Region::cell(2, 0),
                message: "bang".to_string(),
            },
        ];
        let err = MatrixError::TaskFailure {
            failed: 2,
            total: 9,
            failures,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 of 9 leaf tasks failed"));
        assert!(msg.contains("boom"));
        assert!(msg.contains("bang"));
    }
}

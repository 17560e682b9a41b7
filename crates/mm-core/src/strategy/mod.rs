//! Multiplication strategies.
//!
//! Every strategy follows the same shape: check dimensions, allocate the
//! result, decompose the product into leaf tasks that each own a disjoint
//! part of the result, then join.
//!
//! - [`iterative`]: one leaf per result cell, enumerated by a flat loop.
//! - [`vector`]: recursive bisection of rows, then columns, down to single
//!   cells. Same leaves as `iterative`, built divide-and-conquer.
//! - [`blocked`]: the same bisection stopped at a [`BlockSize`], each leaf
//!   running a small triple loop.
//! - [`reference`]: a plain single-threaded triple loop.

pub mod blocked;
pub mod iterative;
pub mod reference;
pub mod vector;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::algebra::{Algebra, Element};
use crate::error::{MatrixError, Result};
use crate::executor::TaskGroup;
use crate::matrix::Matrix;
use crate::view::{MatrixView, MatrixViewMut};

/// Row and column thresholds at which recursive bisection stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize {
    rows: usize,
    cols: usize,
}

impl BlockSize {
    /// A single cell; bisection runs all the way down.
    pub const CELL: BlockSize = BlockSize { rows: 1, cols: 1 };

    /// # Errors
    /// Returns `InvalidBlockSize` if either side is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidBlockSize { rows, cols });
        }
        Ok(BlockSize { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        BlockSize { rows: 2, cols: 2 }
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Which decomposition a multiplication uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Iterative,
    RecursiveVector,
    RecursiveBox(BlockSize),
}

impl Strategy {
    /// All three strategies, the box one at its default block size.
    pub fn all() -> [Strategy; 3] {
        [
            Strategy::Iterative,
            Strategy::RecursiveVector,
            Strategy::RecursiveBox(BlockSize::default()),
        ]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Iterative => write!(f, "iterative"),
            Strategy::RecursiveVector => write!(f, "recursive-vector"),
            Strategy::RecursiveBox(block) => write!(f, "recursive-box({})", block),
        }
    }
}

impl FromStr for Strategy {
    type Err = MatrixError;

    /// Accepts `iterative`, `vector` and `box` (default block size), plus
    /// the `recursive-` forms and `recursive-box(RxC)` produced by `Display`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "iterative" | "flat" => return Ok(Strategy::Iterative),
            "vector" | "recursive-vector" => return Ok(Strategy::RecursiveVector),
            "box" | "recursive-box" => return Ok(Strategy::RecursiveBox(BlockSize::default())),
            _ => {}
        }

        let unknown = || MatrixError::UnknownStrategy(s.to_string());
        let inner = name
            .strip_prefix("recursive-box(")
            .or_else(|| name.strip_prefix("box("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(unknown)?;
        let (rows, cols) = inner.split_once('x').ok_or_else(unknown)?;
        let rows = rows.trim().parse().map_err(|_| unknown())?;
        let cols = cols.trim().parse().map_err(|_| unknown())?;
        Ok(Strategy::RecursiveBox(BlockSize::new(rows, cols)?))
    }
}

/// Validates `lhs.cols == rhs.rows` and allocates the zeroed result.
///
/// Runs before any task is spawned, so a mismatch never reaches the
/// executor.
pub(crate) fn prepare<T, S>(lhs: &Matrix<T>, rhs: &Matrix<T>, strategy: S) -> Result<Matrix<T>>
where
    T: Element,
    S: fmt::Display,
{
    let (m, k, k2, n) = (lhs.rows(), lhs.cols(), rhs.rows(), rhs.cols());
    if k != k2 {
        return Err(MatrixError::IncompatibleDimensions { m, k, k2, n });
    }
    debug!(%strategy, m, k, n, "multiplying");
    Matrix::new(m, n, lhs.algebra().clone())
}

/// ⊕ over i of lhs[row, i] ⊗ rhs[i, col].
pub(crate) fn dot<T: Element>(
    algebra: &Algebra<T>,
    lhs: &MatrixView<'_, T>,
    row: usize,
    rhs: &MatrixView<'_, T>,
    col: usize,
) -> T {
    algebra.dot(lhs.row_iter(row).zip(rhs.col_iter(col)))
}

/// Recursively halves the problem until it fits in `block`, spawning one
/// task per piece that runs `leaf` to compute the cells of its `out`.
///
/// Rows of `lhs` (and `out`) are halved first, until at most `block.rows`
/// remain; only then are columns of `rhs` (and `out`) halved. A dimension
/// of size N splits into N/2 and N - N/2. Because `out` is split by value,
/// the write regions of the spawned leaves are disjoint and together cover
/// all of `out`.
pub(crate) fn bisect<'a, T, L>(
    lhs: MatrixView<'a, T>,
    rhs: MatrixView<'a, T>,
    out: MatrixViewMut<'a, T>,
    block: BlockSize,
    algebra: &'a Algebra<T>,
    leaf: L,
    group: &mut TaskGroup<'a>,
) where
    T: Element,
    L: Fn(&Algebra<T>, MatrixView<'a, T>, MatrixView<'a, T>, MatrixViewMut<'a, T>) + Copy + Send + 'a,
{
    if lhs.rows() > block.rows {
        let mid = lhs.rows() / 2;
        let (lhs_top, lhs_bottom) = lhs.split_rows_at(mid);
        let (out_top, out_bottom) = out.split_rows_at(mid);
        bisect(lhs_top, rhs, out_top, block, algebra, leaf, group);
        bisect(lhs_bottom, rhs, out_bottom, block, algebra, leaf, group);
    } else if rhs.cols() > block.cols {
        let mid = rhs.cols() / 2;
        let (rhs_left, rhs_right) = rhs.split_cols_at(mid);
        let (out_left, out_right) = out.split_cols_at(mid);
        bisect(lhs, rhs_left, out_left, block, algebra, leaf, group);
        bisect(lhs, rhs_right, out_right, block, algebra, leaf, group);
    } else if !out.is_empty() {
        group.spawn(out.region(), move || leaf(algebra, lhs, rhs, out));
    }
}

use std::fmt;

use crate::algebra::{Algebra, Element};
use crate::error::{MatrixError, Result};
use crate::executor::Executor;
use crate::strategy::{self, BlockSize, Strategy};
use crate::view::{check_region, MatrixView, MatrixViewMut};

/// A dense matrix owning its buffer.
///
/// Holds `rows * cols` elements in contiguous row-major order together with
/// the `Algebra` used whenever this matrix is the left operand of a product.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    algebra: Algebra<T>,
}

fn checked_len(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or_else(|| MatrixError::InvalidDimensions {
            rows,
            cols,
            reason: "element count overflows usize".to_string(),
        })
}

impl<T: Element> Matrix<T> {
    /// Create a matrix filled with the algebra's zero.
    pub fn new(rows: usize, cols: usize, algebra: Algebra<T>) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        Ok(Matrix {
            data: vec![algebra.zero().clone(); len],
            rows,
            cols,
            algebra,
        })
    }

    /// Create a matrix from row-major data.
    pub fn from_vec(
        rows: usize,
        cols: usize,
        data: Vec<T>,
        algebra: Algebra<T>,
    ) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        if data.len() != len {
            return Err(MatrixError::InvalidDimensions {
                rows,
                cols,
                reason: format!("data length {} does not match {} elements", data.len(), len),
            });
        }
        Ok(Matrix {
            data,
            rows,
            cols,
            algebra,
        })
    }

    /// Create a matrix whose element at (r, c) is `f(r, c)`.
    pub fn from_fn<F>(rows: usize, cols: usize, algebra: Algebra<T>, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        let len = checked_len(rows, cols)?;
        let mut data = Vec::with_capacity(len);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Ok(Matrix {
            data,
            rows,
            cols,
            algebra,
        })
    }

    /// Create a matrix populated by calling `generator` once per cell, in
    /// row-major order.
    pub fn with_generator<G>(
        rows: usize,
        cols: usize,
        algebra: Algebra<T>,
        mut generator: G,
    ) -> Result<Self>
    where
        G: FnMut() -> T,
    {
        Self::from_fn(rows, cols, algebra, |_, _| generator())
    }

    /// Overwrite every element with a fresh value from `generator`.
    pub fn randomize<G>(&mut self, mut generator: G)
    where
        G: FnMut() -> T,
    {
        for cell in self.data.iter_mut() {
            *cell = generator();
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the algebra products of this matrix are computed in.
    pub fn algebra(&self) -> &Algebra<T> {
        &self.algebra
    }

    /// Returns the underlying row-major data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the underlying row-major data for in-place writes.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns the element at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Result<&T> {
        self.view().get(row, col)
    }

    /// Overwrites the element at (`row`, `col`).
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.view_mut().set(row, col, value)
    }

    /// Read view over the whole matrix.
    pub fn view(&self) -> MatrixView<'_, T> {
        MatrixView::full(&self.data, self.rows, self.cols)
    }

    /// Write view over the whole matrix.
    pub fn view_mut(&mut self) -> MatrixViewMut<'_, T> {
        MatrixViewMut::full(&mut self.data, self.rows, self.cols)
    }

    /// Read view of `rows` x `cols` cells starting at (`from_row`, `from_col`).
    pub fn sub(
        &self,
        from_row: usize,
        rows: usize,
        from_col: usize,
        cols: usize,
    ) -> Result<MatrixView<'_, T>> {
        self.view().sub(from_row, rows, from_col, cols)
    }

    /// Write view of `rows` x `cols` cells starting at (`from_row`, `from_col`).
    pub fn sub_mut(
        &mut self,
        from_row: usize,
        rows: usize,
        from_col: usize,
        cols: usize,
    ) -> Result<MatrixViewMut<'_, T>> {
        check_region(self.rows, self.cols, from_row, rows, from_col, cols)?;
        let (_, rest) = self.view_mut().split_rows_at(from_row);
        let (rest, _) = rest.split_rows_at(rows);
        let (_, rest) = rest.split_cols_at(from_col);
        let (view, _) = rest.split_cols_at(cols);
        Ok(view)
    }

    /// Matrix product using one leaf task per result cell.
    ///
    /// self is [m, k], op is [k, n], result is [m, n].
    pub fn multiply_iterative(
        &self,
        op: &Matrix<T>,
        executor: &dyn Executor,
    ) -> Result<Matrix<T>> {
        strategy::iterative::multiply(self, op, executor)
    }

    /// Matrix product by recursive bisection down to single result cells.
    pub fn multiply_recursive_vector(
        &self,
        op: &Matrix<T>,
        executor: &dyn Executor,
    ) -> Result<Matrix<T>> {
        strategy::vector::multiply(self, op, executor)
    }

    /// Matrix product by recursive bisection down to blocks of at most
    /// `block` cells, each computed by one leaf task.
    pub fn multiply_recursive_box(
        &self,
        op: &Matrix<T>,
        block: BlockSize,
        executor: &dyn Executor,
    ) -> Result<Matrix<T>> {
        strategy::blocked::multiply(self, op, block, executor)
    }

    /// Matrix product using the given strategy.
    pub fn multiply(
        &self,
        op: &Matrix<T>,
        strategy: Strategy,
        executor: &dyn Executor,
    ) -> Result<Matrix<T>> {
        match strategy {
            Strategy::Iterative => self.multiply_iterative(op, executor),
            Strategy::RecursiveVector => self.multiply_recursive_vector(op, executor),
            Strategy::RecursiveBox(block) => self.multiply_recursive_box(op, block, executor),
        }
    }

    /// Single-threaded triple-loop product, used as the reference the
    /// parallel strategies are checked against.
    pub fn multiply_reference(&self, op: &Matrix<T>) -> Result<Matrix<T>> {
        strategy::reference::multiply(self, op)
    }
}

impl<T: fmt::Display> Matrix<T> {
    /// Row-major text rendering: elements separated by a space, rows by a
    /// newline.
    pub fn description(&self) -> String {
        crate::view::render(self.rows, self.cols, |r, c| &self.data[r * self.cols + c])
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Compares shape and contents; the algebras are not compared.
impl<T: PartialEq> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.data == other.data
    }
}

use std::fmt;
use std::marker::PhantomData;

use crate::error::{MatrixError, Result};

/// A rectangle of cells: `rows` x `cols` starting at (`row`, `col`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Region {
    pub fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Region {
            row,
            col,
            rows,
            cols,
        }
    }

    /// A single-cell region.
    pub fn cell(row: usize, col: usize) -> Self {
        Region::new(row, col, 1, 1)
    }

    /// Number of cells covered.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Iterates the covered (row, col) coordinates in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let Region {
            row,
            col,
            rows,
            cols,
        } = *self;
        (row..row + rows).flat_map(move |r| (col..col + cols).map(move |c| (r, c)))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{}",
            self.row,
            self.row + self.rows,
            self.col,
            self.col + self.cols
        )
    }
}

/// Checks that `[from_row, from_row + rows) x [from_col, from_col + cols)`
/// fits in a `bound_rows` x `bound_cols` extent.
///
/// On failure the error names the first requested coordinate that falls
/// outside the extent.
pub(crate) fn check_region(
    bound_rows: usize,
    bound_cols: usize,
    from_row: usize,
    rows: usize,
    from_col: usize,
    cols: usize,
) -> Result<()> {
    let rows_fit = from_row
        .checked_add(rows)
        .is_some_and(|end| end <= bound_rows);
    let cols_fit = from_col
        .checked_add(cols)
        .is_some_and(|end| end <= bound_cols);
    if rows_fit && cols_fit {
        return Ok(());
    }
    Err(MatrixError::IndexOutOfRange {
        row: if rows_fit { from_row } else { from_row.max(bound_rows) },
        col: if cols_fit { from_col } else { from_col.max(bound_cols) },
        rows: bound_rows,
        cols: bound_cols,
    })
}

fn check_index(row: usize, col: usize, rows: usize, cols: usize) -> Result<()> {
    if row < rows && col < cols {
        Ok(())
    } else {
        Err(MatrixError::IndexOutOfRange {
            row,
            col,
            rows,
            cols,
        })
    }
}

/// Row-major text: elements separated by a space, rows by a newline.
pub(crate) fn render<'x, T, F>(rows: usize, cols: usize, cell: F) -> String
where
    T: fmt::Display + 'x,
    F: Fn(usize, usize) -> &'x T,
{
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| cell(r, c).to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A read-only window into a matrix buffer.
///
/// Offsets are always relative to the backing buffer, so a view of a view
/// costs the same to index as a view of the matrix. Views are `Copy` and
/// cannot outlive the matrix they borrow.
pub struct MatrixView<'a, T> {
    data: &'a [T],
    stride: usize,
    from_row: usize,
    from_col: usize,
    rows: usize,
    cols: usize,
}

impl<T> Clone for MatrixView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixView<'_, T> {}

impl<'a, T> MatrixView<'a, T> {
    /// Full-extent view over a `rows` x `cols` row-major buffer.
    pub(crate) fn full(data: &'a [T], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        MatrixView {
            data,
            stride: cols,
            from_row: 0,
            from_col: 0,
            rows,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Position and extent of this view in the backing matrix.
    pub fn region(&self) -> Region {
        Region::new(self.from_row, self.from_col, self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Returns the element at view-local (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Result<&'a T> {
        check_index(row, col, self.rows, self.cols)?;
        Ok(self.at(row, col))
    }

    /// Element access without the `Result`, for kernels whose loops are
    /// bounded by the view extent.
    pub(crate) fn at(&self, row: usize, col: usize) -> &'a T {
        debug_assert!(row < self.rows && col < self.cols);
        &self.data[(row + self.from_row) * self.stride + col + self.from_col]
    }

    /// A nested view; coordinates are local to this view.
    pub fn sub(&self, from_row: usize, rows: usize, from_col: usize, cols: usize) -> Result<Self> {
        check_region(self.rows, self.cols, from_row, rows, from_col, cols)?;
        Ok(MatrixView {
            from_row: self.from_row + from_row,
            from_col: self.from_col + from_col,
            rows,
            cols,
            ..*self
        })
    }

    /// Splits into the rows before `mid` and the rows from `mid` on.
    ///
    /// # Panics
    /// Panics if `mid > rows()`.
    pub fn split_rows_at(self, mid: usize) -> (Self, Self) {
        assert!(mid <= self.rows, "row split {} beyond {} rows", mid, self.rows);
        let top = MatrixView { rows: mid, ..self };
        let bottom = MatrixView {
            from_row: self.from_row + mid,
            rows: self.rows - mid,
            ..self
        };
        (top, bottom)
    }

    /// Splits into the columns before `mid` and the columns from `mid` on.
    ///
    /// # Panics
    /// Panics if `mid > cols()`.
    pub fn split_cols_at(self, mid: usize) -> (Self, Self) {
        assert!(mid <= self.cols, "column split {} beyond {} columns", mid, self.cols);
        let left = MatrixView { cols: mid, ..self };
        let right = MatrixView {
            from_col: self.from_col + mid,
            cols: self.cols - mid,
            ..self
        };
        (left, right)
    }

    /// Iterates row `row` of the view.
    pub(crate) fn row_iter(&self, row: usize) -> impl Iterator<Item = &'a T> + '_ {
        (0..self.cols).map(move |c| self.at(row, c))
    }

    /// Iterates column `col` of the view.
    pub(crate) fn col_iter(&self, col: usize) -> impl Iterator<Item = &'a T> + '_ {
        (0..self.rows).map(move |r| self.at(r, col))
    }
}

impl<T: fmt::Display> MatrixView<'_, T> {
    pub fn description(&self) -> String {
        render(self.rows, self.cols, |r, c| self.at(r, c))
    }
}

impl<T: fmt::Display> fmt::Display for MatrixView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl<T> fmt::Debug for MatrixView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixView")
            .field("region", &self.region())
            .field("stride", &self.stride)
            .finish()
    }
}

/// An exclusive, writable window into a matrix buffer.
///
/// Unlike [`MatrixView`] this cannot be copied. The only ways to get two
/// write views out of one are [`split_rows_at`](Self::split_rows_at) and
/// [`split_cols_at`](Self::split_cols_at), which consume the view and
/// return halves covering disjoint cells. Every live write view derived from
/// one `&mut` borrow of a matrix therefore owns a distinct set of cells,
/// which is what lets leaf tasks on different threads write the same buffer
/// without locks.
pub struct MatrixViewMut<'a, T> {
    ptr: *mut T,
    len: usize,
    stride: usize,
    from_row: usize,
    from_col: usize,
    rows: usize,
    cols: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: a `MatrixViewMut` is an exclusive borrow of the cells in its
// region, exactly like `&mut [T]` restricted to those cells. No two live
// write views cover the same cell, so moving one to another thread is as
// safe as moving a `&mut T`.
unsafe impl<T: Send> Send for MatrixViewMut<'_, T> {}
// SAFETY: `&MatrixViewMut` only hands out `&T` to cells of its own region.
unsafe impl<T: Sync> Sync for MatrixViewMut<'_, T> {}

impl<'a, T> MatrixViewMut<'a, T> {
    /// Full-extent write view over a `rows` x `cols` row-major buffer.
    pub(crate) fn full(data: &'a mut [T], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        MatrixViewMut {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            stride: cols,
            from_row: 0,
            from_col: 0,
            rows,
            cols,
            _marker: PhantomData,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Position and extent of this view in the backing matrix.
    pub fn region(&self) -> Region {
        Region::new(self.from_row, self.from_col, self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "({}, {}) outside {}x{} write view",
            row,
            col,
            self.rows,
            self.cols
        );
        let offset = (row + self.from_row) * self.stride + col + self.from_col;
        debug_assert!(offset < self.len);
        offset
    }

    pub(crate) fn at(&self, row: usize, col: usize) -> &T {
        let offset = self.offset(row, col);
        // SAFETY: `offset` addresses a cell inside this view's region, which
        // lies inside the backing buffer and is covered by no other view.
        unsafe { &*self.ptr.add(offset) }
    }

    pub(crate) fn at_mut(&mut self, row: usize, col: usize) -> &mut T {
        let offset = self.offset(row, col);
        // SAFETY: as in `at`, and `&mut self` makes the access exclusive.
        unsafe { &mut *self.ptr.add(offset) }
    }

    /// Returns the element at view-local (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Result<&T> {
        check_index(row, col, self.rows, self.cols)?;
        Ok(self.at(row, col))
    }

    /// Overwrites the element at view-local (`row`, `col`).
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        check_index(row, col, self.rows, self.cols)?;
        *self.at_mut(row, col) = value;
        Ok(())
    }

    /// A nested write view borrowing this one; coordinates are local to
    /// this view.
    pub fn sub_mut(
        &mut self,
        from_row: usize,
        rows: usize,
        from_col: usize,
        cols: usize,
    ) -> Result<MatrixViewMut<'_, T>> {
        check_region(self.rows, self.cols, from_row, rows, from_col, cols)?;
        Ok(MatrixViewMut {
            ptr: self.ptr,
            len: self.len,
            stride: self.stride,
            from_row: self.from_row + from_row,
            from_col: self.from_col + from_col,
            rows,
            cols,
            _marker: PhantomData,
        })
    }

    /// Splits into the rows before `mid` and the rows from `mid` on.
    ///
    /// # Panics
    /// Panics if `mid > rows()`.
    pub fn split_rows_at(self, mid: usize) -> (Self, Self) {
        assert!(mid <= self.rows, "row split {} beyond {} rows", mid, self.rows);
        let bottom = MatrixViewMut {
            from_row: self.from_row + mid,
            rows: self.rows - mid,
            ..self.alias()
        };
        let top = MatrixViewMut { rows: mid, ..self };
        (top, bottom)
    }

    /// Splits into the columns before `mid` and the columns from `mid` on.
    ///
    /// # Panics
    /// Panics if `mid > cols()`.
    pub fn split_cols_at(self, mid: usize) -> (Self, Self) {
        assert!(mid <= self.cols, "column split {} beyond {} columns", mid, self.cols);
        let right = MatrixViewMut {
            from_col: self.from_col + mid,
            cols: self.cols - mid,
            ..self.alias()
        };
        let left = MatrixViewMut { cols: mid, ..self };
        (left, right)
    }

    // Only called by the split functions, which shrink both copies to
    // disjoint halves before returning them.
    fn alias(&self) -> Self {
        MatrixViewMut {
            ptr: self.ptr,
            len: self.len,
            stride: self.stride,
            from_row: self.from_row,
            from_col: self.from_col,
            rows: self.rows,
            cols: self.cols,
            _marker: PhantomData,
        }
    }
}

impl<T: fmt::Display> MatrixViewMut<'_, T> {
    pub fn description(&self) -> String {
        render(self.rows, self.cols, |r, c| self.at(r, c))
    }
}

impl<T: fmt::Display> fmt::Display for MatrixViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl<T> fmt::Debug for MatrixViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixViewMut")
            .field("region", &self.region())
            .field("stride", &self.stride)
            .finish()
    }
}

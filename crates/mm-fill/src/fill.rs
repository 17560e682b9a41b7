use mm_core::{Algebra, Element, Matrix};

use crate::error::Result;

/// A source of values for populating matrices.
pub trait Fill<T>: Send {
    /// Returns the name of this fill.
    fn name(&self) -> &str;

    /// Produces the next value.
    fn next_value(&mut self) -> T;
}

/// Builds a `rows` x `cols` matrix by drawing one value per cell from
/// `fill`, in row-major order.
pub fn fill_matrix<T, F>(
    rows: usize,
    cols: usize,
    algebra: Algebra<T>,
    fill: &mut F,
) -> Result<Matrix<T>>
where
    T: Element,
    F: Fill<T> + ?Sized,
{
    Ok(Matrix::with_generator(rows, cols, algebra, || {
        fill.next_value()
    })?)
}

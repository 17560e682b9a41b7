use crate::algebra::Element;
use crate::error::Result;
use crate::executor::{Executor, TaskGroup};
use crate::matrix::Matrix;
use crate::strategy::{dot, prepare, Strategy};
use crate::view::Region;

/// One leaf task per result cell, enumerated by a flat loop over the result
/// buffer.
///
/// Each task owns the `&mut T` of its cell, so `rows(lhs) * cols(rhs)` tasks
/// write the buffer concurrently without any sharing.
pub fn multiply<T: Element>(
    lhs: &Matrix<T>,
    rhs: &Matrix<T>,
    executor: &dyn Executor,
) -> Result<Matrix<T>> {
    let mut result = prepare(lhs, rhs, Strategy::Iterative)?;
    let n = result.cols();
    let algebra = lhs.algebra();
    let (a, b) = (lhs.view(), rhs.view());

    let mut group = TaskGroup::new();
    for (offset, cell) in result.as_mut_slice().iter_mut().enumerate() {
        let (row, col) = (offset / n, offset % n);
        group.spawn(Region::cell(row, col), move || {
            *cell = dot(algebra, &a, row, &b, col);
        });
    }
    group.join(executor)?;

    Ok(result)
}

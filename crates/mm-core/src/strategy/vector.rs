use crate::algebra::{Algebra, Element};
use crate::error::Result;
use crate::executor::{Executor, TaskGroup};
use crate::matrix::Matrix;
use crate::strategy::{bisect, dot, prepare, BlockSize, Strategy};
use crate::view::{MatrixView, MatrixViewMut};

/// Recursive bisection down to single result cells.
///
/// Produces the same leaves as the iterative strategy, but finds them by
/// halving rows of `lhs` until one remains, then halving columns of `rhs`
/// until one remains.
pub fn multiply<T: Element>(
    lhs: &Matrix<T>,
    rhs: &Matrix<T>,
    executor: &dyn Executor,
) -> Result<Matrix<T>> {
    let mut result = prepare(lhs, rhs, Strategy::RecursiveVector)?;
    let algebra = lhs.algebra();

    let mut group = TaskGroup::new();
    bisect(
        lhs.view(),
        rhs.view(),
        result.view_mut(),
        BlockSize::CELL,
        algebra,
        cell_leaf::<T>,
        &mut group,
    );
    group.join(executor)?;

    Ok(result)
}

/// Writes the single cell of `out`: row 0 of `lhs` against column 0 of `rhs`.
fn cell_leaf<T: Element>(
    algebra: &Algebra<T>,
    lhs: MatrixView<'_, T>,
    rhs: MatrixView<'_, T>,
    mut out: MatrixViewMut<'_, T>,
) {
    *out.at_mut(0, 0) = dot(algebra, &lhs, 0, &rhs, 0);
}

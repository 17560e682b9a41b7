use crate::algebra::{Algebra, Element};
use crate::error::Result;
use crate::executor::{Executor, TaskGroup};
use crate::matrix::Matrix;
use crate::strategy::{bisect, dot, prepare, BlockSize, Strategy};
use crate::view::{MatrixView, MatrixViewMut};

/// Recursive bisection down to blocks of at most `block` result cells.
///
/// Bisection follows the vector strategy but stops once `lhs` has at most
/// `block.rows()` rows and `rhs` at most `block.cols()` columns. Each leaf
/// then computes its whole block in one task. Larger blocks mean fewer,
/// coarser tasks; the product is the same for every block size.
pub fn multiply<T: Element>(
    lhs: &Matrix<T>,
    rhs: &Matrix<T>,
    block: BlockSize,
    executor: &dyn Executor,
) -> Result<Matrix<T>> {
    let mut result = prepare(lhs, rhs, Strategy::RecursiveBox(block))?;
    let algebra = lhs.algebra();

    let mut group = TaskGroup::new();
    bisect(
        lhs.view(),
        rhs.view(),
        result.view_mut(),
        block,
        algebra,
        block_leaf::<T>,
        &mut group,
    );
    group.join(executor)?;

    Ok(result)
}

/// Block-local triple loop over every cell of `out`.
fn block_leaf<T: Element>(
    algebra: &Algebra<T>,
    lhs: MatrixView<'_, T>,
    rhs: MatrixView<'_, T>,
    mut out: MatrixViewMut<'_, T>,
) {
    for row in 0..lhs.rows() {
        for col in 0..rhs.cols() {
            *out.at_mut(row, col) = dot(algebra, &lhs, row, &rhs, col);
        }
    }
}

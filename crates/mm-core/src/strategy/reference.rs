use crate::algebra::Element;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::strategy::{dot, prepare};

/// Plain triple loop on the calling thread, no executor involved.
pub fn multiply<T: Element>(lhs: &Matrix<T>, rhs: &Matrix<T>) -> Result<Matrix<T>> {
    let mut result = prepare(lhs, rhs, "reference")?;
    let algebra = lhs.algebra();
    let (a, b) = (lhs.view(), rhs.view());
    let mut out = result.view_mut();
    for row in 0..a.rows() {
        for col in 0..b.cols() {
            *out.at_mut(row, col) = dot(algebra, &a, row, &b, col);
        }
    }
    Ok(result)
}

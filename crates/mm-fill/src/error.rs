use mm_core::MatrixError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FillError {
    #[error("empty range: low {low} must be below high {high}")]
    EmptyRange { low: String, high: String },

    #[error("invalid probability {0}: must be within [0, 1]")]
    InvalidProbability(f64),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub type Result<T> = std::result::Result<T, FillError>;

pub mod bernoulli;
pub mod error;
pub mod fill;
pub mod uniform;

pub use bernoulli::BernoulliFill;
pub use error::{FillError, Result};
pub use fill::{fill_matrix, Fill};
pub use uniform::UniformFill;

use std::cmp::Ordering;
use std::fmt::Debug;

use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{FillError, Result};
use crate::fill::Fill;

/// Draws values uniformly from the half-open range `[low, high)` using a
/// seeded RNG, so the same seed always yields the same sequence.
pub struct UniformFill<T> {
    low: T,
    high: T,
    rng: StdRng,
}

impl<T> UniformFill<T>
where
    T: SampleUniform + PartialOrd + Copy + Debug,
{
    pub fn new(low: T, high: T, seed: u64) -> Result<Self> {
        if low.partial_cmp(&high) != Some(Ordering::Less) {
            return Err(FillError::EmptyRange {
                low: format!("{low:?}"),
                high: format!("{high:?}"),
            });
        }
        Ok(Self {
            low,
            high,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn low(&self) -> T {
        self.low
    }

    pub fn high(&self) -> T {
        self.high
    }
}

impl<T> Fill<T> for UniformFill<T>
where
    T: SampleUniform + PartialOrd + Copy + Debug + Send,
{
    fn name(&self) -> &str {
        "uniform"
    }

    fn next_value(&mut self) -> T {
        self.rng.gen_range(self.low..self.high)
    }
}

use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{FillError, Result};
use crate::fill::Fill;

/// Draws `true` with probability `p`, for populating boolean matrices such
/// as adjacency relations.
pub struct BernoulliFill {
    dist: Bernoulli,
    rng: StdRng,
}

impl BernoulliFill {
    pub fn new(p: f64, seed: u64) -> Result<Self> {
        let dist = Bernoulli::new(p).map_err(|_| FillError::InvalidProbability(p))?;
        Ok(Self {
            dist,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Fill<bool> for BernoulliFill {
    fn name(&self) -> &str {
        "bernoulli"
    }

    fn next_value(&mut self) -> bool {
        self.dist.sample(&mut self.rng)
    }
}

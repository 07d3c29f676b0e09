use rand::{rngs::StdRng, SeedableRng};

use crate::error::{Error, Result};

/// Failure probability used when none is given.
pub const DEFAULT_DELTA: f64 = 0.01;

/// Parameters shared by every sketch a controller builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchConfig {
    /// Target failure probability of a single l0 sample. Smaller values mean
    /// more hash tables and evaluation points per sketch.
    pub delta: f64,
    /// Seed for the controller's random generator. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            seed: None,
        }
    }
}

impl SketchConfig {
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_delta(self.delta)
    }

    /// Generator all sketches of one controller are drawn from.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

pub(crate) fn validate_delta(delta: f64) -> Result<()> {
    if delta.is_finite() && delta > 0.0 && delta < 1.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "delta must be finite and strictly between 0 and 1, got {delta}"
        )))
    }
}

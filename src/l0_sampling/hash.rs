use rand::Rng;

use super::{add_mod, mul_mod, prime::prime_above_4x, Index};
use crate::error::{Error, Result};

/// Random polynomial of degree `k - 1` over a prime field, reduced into
/// `0..domain`. A draw from a `k`-wise independent family.
///
/// Immutable once drawn, so the same index always lands in the same place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashFunction {
    domain: u64,
    prime: u64,
    coefficients: Vec<u64>,
}

impl HashFunction {
    /// Hash into `0..domain` with `k` random coefficients over the field of
    /// the smallest prime >= `8 * domain`.
    pub fn new(domain: u64, k: usize, rng: &mut impl Rng) -> Result<Self> {
        Self::with_universe(domain, domain, k, rng)
    }

    /// Like [`HashFunction::new`], but the field is also large enough that
    /// distinct keys in `0..universe` are distinct field elements.
    pub fn with_universe(
        domain: u64,
        universe: u64,
        k: usize,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if domain == 0 {
            return Err(Error::invalid("hash domain must be positive"));
        }
        if k == 0 {
            return Err(Error::invalid("hash needs at least one coefficient"));
        }
        let bound = domain
            .max(universe)
            .checked_mul(2)
            .ok_or_else(|| Error::overflow("hash field size"))?;
        let prime = prime_above_4x(bound)?;
        Self::from_coefficients(
            domain,
            prime,
            (0..k).map(|_| rng.gen_range(0..prime)).collect(),
        )
    }

    /// Fixed coefficients, lowest degree first. `prime` is taken on trust;
    /// only its size is checked.
    pub fn from_coefficients(domain: u64, prime: u64, coefficients: Vec<u64>) -> Result<Self> {
        if domain == 0 {
            return Err(Error::invalid("hash domain must be positive"));
        }
        if prime < 2 {
            return Err(Error::invalid(format!("hash field size {prime} is not prime")));
        }
        if coefficients.is_empty() {
            return Err(Error::invalid("hash needs at least one coefficient"));
        }
        Ok(Self {
            domain,
            prime,
            coefficients,
        })
    }

    pub fn evaluate(&self, x: Index) -> u64 {
        let x = x % self.prime;
        let value = self
            .coefficients
            .iter()
            .rev()
            .fold(0, |acc, &c| add_mod(mul_mod(acc, x, self.prime), c, self.prime));
        value % self.domain
    }

    pub fn domain(&self) -> u64 {
        self.domain
    }

    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Number of coefficients, one more than the polynomial degree.
    pub fn k(&self) -> usize {
        self.coefficients.len()
    }
}

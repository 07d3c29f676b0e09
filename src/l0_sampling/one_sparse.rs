use std::ops::{Add, AddAssign};
use std::sync::Arc;

use derivative::Derivative;
use rand::Rng;

use super::{
    add_mod, mul_mod, pow_mod, prime::prime_above_4x, repetitions_for, to_field, Index, Value,
};
use crate::config::validate_delta;
use crate::error::Result;

/// Sketch that recovers a vector with exactly one non-zero entry.
///
/// Keeps `s1 = Σ value` and `s2 = Σ index·value`, so a one-sparse vector is
/// `(s2 / s1, s1)`. The guess is confirmed against fingerprints
/// `Σ value·z^index mod p` at random points `z`; a vector with more than one
/// non-zero entry passes every fingerprint with probability at most `delta`.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct OneSparseRecoverer {
    s1: i128,
    s2: i128,
    fingerprints: Vec<u64>,
    #[derivative(Debug = "ignore")]
    points: Arc<[u64]>,
    prime: u64,
}

impl OneSparseRecoverer {
    /// Empty sketch for indices in `0..size`.
    pub fn new(size: u64, delta: f64, rng: &mut impl Rng) -> Result<Self> {
        validate_delta(delta)?;
        let prime = prime_above_4x(size.max(1))?;
        let points: Arc<[u64]> = (0..repetitions_for(delta))
            .map(|_| rng.gen_range(1..prime))
            .collect();
        Ok(Self {
            s1: 0,
            s2: 0,
            fingerprints: vec![0; points.len()],
            points,
            prime,
        })
    }

    pub fn update(&mut self, index: Index, delta: Value) {
        self.s1 += delta as i128;
        self.s2 += index as i128 * delta as i128;
        let delta = to_field(delta, self.prime);
        for (fp, &z) in self.fingerprints.iter_mut().zip(self.points.iter()) {
            let term = mul_mod(delta, pow_mod(z, index, self.prime), self.prime);
            *fp = add_mod(*fp, term, self.prime);
        }
    }

    /// Whether the sketched vector looks one-sparse. An exact divisibility
    /// check followed by the fingerprint test.
    pub fn correct(&self) -> bool {
        if self.s1 == 0 || self.s2 % self.s1 != 0 || self.s2.signum() * self.s1.signum() < 0 {
            return false;
        }
        let Some((index, value)) = self.decode() else {
            return false;
        };
        let value = to_field(value, self.prime);
        self.fingerprints
            .iter()
            .zip(self.points.iter())
            .all(|(&fp, &z)| mul_mod(value, pow_mod(z, index, self.prime), self.prime) == fp)
    }

    /// The single non-zero `(index, value)`, if [`Self::correct`] holds.
    pub fn recover(&self) -> Option<(Index, Value)> {
        if self.correct() {
            self.decode()
        } else {
            None
        }
    }

    /// No mass at all, as after cancelling every update.
    pub fn is_zero(&self) -> bool {
        self.s1 == 0 && self.s2 == 0 && self.fingerprints.iter().all(|&fp| fp == 0)
    }

    /// Number of fingerprint tests.
    pub fn k(&self) -> usize {
        self.points.len()
    }

    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Can be added to `other`: same field and same evaluation points.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.prime == other.prime
            && (Arc::ptr_eq(&self.points, &other.points) || self.points == other.points)
    }

    // Unchecked: meaningful only for a one-sparse vector.
    fn decode(&self) -> Option<(Index, Value)> {
        let index = Index::try_from(self.s2 / self.s1).ok()?;
        let value = Value::try_from(self.s1).ok()?;
        Some((index, value))
    }
}

impl AddAssign<&OneSparseRecoverer> for OneSparseRecoverer {
    fn add_assign(&mut self, rhs: &OneSparseRecoverer) {
        assert!(
            self.is_compatible(rhs),
            "adding one-sparse sketches with different parameters"
        );
        self.s1 += rhs.s1;
        self.s2 += rhs.s2;
        for (fp, &other) in self.fingerprints.iter_mut().zip(&rhs.fingerprints) {
            *fp = add_mod(*fp, other, self.prime);
        }
        self.points = Arc::clone(&rhs.points);
    }
}

impl Add for OneSparseRecoverer {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

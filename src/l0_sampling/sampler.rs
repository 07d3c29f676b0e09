use std::fmt::{Debug, Formatter};
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use debug_tree::TreeBuilder;
use rand::{seq::SliceRandom, Rng};

use super::{HashFunction, Index, SSparseRecoverer, Value};
use crate::config::validate_delta;
use crate::error::{Error, Result};

/// l0-sampler: returns one non-zero coordinate of a vector given only as a
/// stream of additive updates.
///
/// Level `i` sees the updates whose index hashes to a multiple of `2^i`, so
/// it holds roughly a `2^-i` fraction of the non-zero entries. Some level is
/// sparse enough for its [`SSparseRecoverer`] to recover exactly; sampling
/// walks from the sparsest level down and picks uniformly among what the first
/// non-empty level recovers.
#[derive(Clone)]
pub struct L0Sampler {
    levels: Vec<SSparseRecoverer>,
    hash: Arc<HashFunction>,
    s_value: usize,
    size: u64,
}

impl L0Sampler {
    /// Empty sampler for indices in `0..size` with failure probability about `delta`.
    pub fn new(size: u64, delta: f64, rng: &mut impl Rng) -> Result<Self> {
        validate_delta(delta)?;
        if size == 0 {
            return Err(Error::invalid("sampler size must be positive"));
        }
        let s_value = 3 * (1 - (delta / 2.0).log2().ceil() as i64) as usize;
        let k_levels = 1 + (size as f64).ln().ceil() as usize;
        let domain = size
            .checked_mul(size)
            .and_then(|sq| sq.checked_mul(size))
            .ok_or_else(|| Error::overflow("subsampling hash domain"))?;
        let hash = Arc::new(HashFunction::new(domain, s_value, rng)?);
        let levels = (0..k_levels)
            .map(|_| SSparseRecoverer::new(size, s_value, delta / 2.0, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            levels,
            hash,
            s_value,
            size,
        })
    }

    pub fn update(&mut self, index: Index, delta: Value) {
        let depth = self.hash.evaluate(index).trailing_zeros() as usize;
        for level in self.levels.iter_mut().take(depth + 1) {
            level.update(index, delta);
        }
    }

    /// A non-zero `(index, value)` of the sketched vector, or `None` if no
    /// level recovers anything. `None` for the zero vector, and with small
    /// probability otherwise.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<(Index, Value)> {
        self.levels
            .iter()
            .rev()
            .map(|level| level.recover())
            .find(|found| !found.is_empty())
            .and_then(|found| found.choose(rng).copied())
    }

    pub fn levels(&self) -> &[SSparseRecoverer] {
        &self.levels
    }

    pub fn s_value(&self) -> usize {
        self.s_value
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_compatible(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.hash, &other.hash) || self.hash == other.hash)
            && self.levels.len() == other.levels.len()
            && self
                .levels
                .iter()
                .zip(&other.levels)
                .all(|(a, b)| a.is_compatible(b))
    }
}

impl Debug for L0Sampler {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        let _b = builder.add_branch(&format!(
            "L0Sampler size = {} s = {}",
            self.size, self.s_value
        ));
        for (i, level) in self.levels.iter().enumerate() {
            if level.touched() {
                let _l = builder.add_branch(&format!("level {i} updates = {}", level.updates()));
                level.add_to_tree(&builder);
            }
        }
        writeln!(f, "{}", builder.string())
    }
}

impl AddAssign<&L0Sampler> for L0Sampler {
    fn add_assign(&mut self, rhs: &L0Sampler) {
        assert!(
            self.levels.len() == rhs.levels.len()
                && (Arc::ptr_eq(&self.hash, &rhs.hash) || self.hash == rhs.hash),
            "adding l0-samplers with different subsampling"
        );
        for (a, b) in self.levels.iter_mut().zip(&rhs.levels) {
            *a += b;
        }
    }
}

impl Add for L0Sampler {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

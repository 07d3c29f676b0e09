use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use debug_tree::TreeBuilder;
use rand::Rng;

use super::{repetitions_for, HashFunction, Index, OneSparseRecoverer, Value};
use crate::config::validate_delta;
use crate::error::{Error, Result};

/// CountSketch-like recovery of vectors with at most `s` non-zero entries.
///
/// `k` independent tables of `2s` buckets, each bucket a [`OneSparseRecoverer`].
/// Every update goes to one bucket per table, chosen by that table's hash. With
/// probability at least `1 - delta` every non-zero entry of an `s`-sparse
/// vector is alone in some bucket, and is recovered from there.
#[derive(Clone)]
pub struct SSparseRecoverer {
    tables: Vec<Vec<OneSparseRecoverer>>,
    hashes: Arc<[HashFunction]>,
    s: usize,
    updates: u64,
}

impl SSparseRecoverer {
    /// Empty sketch for indices in `0..size`.
    pub fn new(size: u64, s: usize, delta: f64, rng: &mut impl Rng) -> Result<Self> {
        validate_delta(delta)?;
        if s == 0 {
            return Err(Error::invalid("sparsity must be positive"));
        }
        let k = repetitions_for(delta / 2.0);
        let bucket_delta = delta / (2.0 * k as f64 * s as f64);
        let mut tables = Vec::with_capacity(k);
        let mut hashes = Vec::with_capacity(k);
        for _ in 0..k {
            let table = (0..2 * s)
                .map(|_| OneSparseRecoverer::new(size, bucket_delta, rng))
                .collect::<Result<Vec<_>>>()?;
            tables.push(table);
            hashes.push(HashFunction::with_universe(2 * s as u64, size, 2, rng)?);
        }
        Ok(Self {
            tables,
            hashes: hashes.into(),
            s,
            updates: 0,
        })
    }

    pub fn update(&mut self, index: Index, delta: Value) {
        self.updates += 1;
        for (table, hash) in self.tables.iter_mut().zip(self.hashes.iter()) {
            table[hash.evaluate(index) as usize].update(index, delta);
        }
    }

    /// Every entry isolated in some bucket, in table-then-bucket order of first
    /// sighting. Complete for `s`-sparse vectors with probability `1 - delta`.
    pub fn recover(&self) -> Vec<(Index, Value)> {
        let mut position: BTreeMap<Index, usize> = BTreeMap::new();
        let mut result: Vec<(Index, Value)> = vec![];
        for (index, value) in self.tables.iter().flatten().filter_map(|b| b.recover()) {
            match position.get(&index) {
                Some(&i) => result[i].1 = value,
                None => {
                    position.insert(index, result.len());
                    result.push((index, value));
                }
            }
        }
        result
    }

    /// Received at least one update, even if they all cancelled.
    pub fn touched(&self) -> bool {
        self.updates != 0
    }

    /// The sketched vector is zero.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().flatten().all(|b| b.is_zero())
    }

    pub fn s(&self) -> usize {
        self.s
    }

    /// Number of tables.
    pub fn k(&self) -> usize {
        self.tables.len()
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn is_compatible(&self, other: &Self) -> bool {
        self.s == other.s
            && (Arc::ptr_eq(&self.hashes, &other.hashes) || self.hashes == other.hashes)
            && self.tables.len() == other.tables.len()
            && self
                .tables
                .iter()
                .flatten()
                .zip(other.tables.iter().flatten())
                .all(|(a, b)| a.is_compatible(b))
    }

    /// Non-empty buckets only.
    pub(crate) fn add_to_tree(&self, tree: &TreeBuilder) {
        for (i, table) in self.tables.iter().enumerate() {
            let _b = tree.add_branch(&format!("table {i}"));
            for (j, bucket) in table.iter().enumerate() {
                if !bucket.is_zero() {
                    tree.add_leaf(&format!("bucket {j}: {:?}", bucket.recover()));
                }
            }
        }
    }
}

impl Debug for SSparseRecoverer {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        let _b = builder.add_branch(&format!(
            "SSparseRecoverer s = {} updates = {}",
            self.s, self.updates
        ));
        self.add_to_tree(&builder);
        writeln!(f, "{}", builder.string())
    }
}

impl AddAssign<&SSparseRecoverer> for SSparseRecoverer {
    fn add_assign(&mut self, rhs: &SSparseRecoverer) {
        assert!(
            self.s == rhs.s
                && self.tables.len() == rhs.tables.len()
                && (Arc::ptr_eq(&self.hashes, &rhs.hashes) || self.hashes == rhs.hashes),
            "adding s-sparse sketches with different bucket hashes"
        );
        for (a, b) in self.tables.iter_mut().flatten().zip(rhs.tables.iter().flatten()) {
            *a += b;
        }
        self.updates += rhs.updates;
    }
}

impl Add for SSparseRecoverer {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

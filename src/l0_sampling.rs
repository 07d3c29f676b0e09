//! Linear sketches over integer vectors given as streams of `(index, delta)`
//! updates. Nothing here knows about graphs.
//!
//! The stack, bottom up: [`prime`] finds field sizes, [`hash`] is a polynomial
//! hash family over those fields, [`one_sparse`] recovers a vector with a single
//! non-zero entry, [`s_sparse`] recovers up to `s` entries by hashing into
//! buckets of one-sparse recoverers, and [`sampler`] stacks s-sparse recoverers
//! over geometrically subsampled copies of the stream to return one surviving
//! non-zero coordinate.
//!
//! All sketches are linear: two sketches built from the same random parameters
//! can be added, and the sum sketches the sum of the two vectors.

pub mod hash;
pub mod one_sparse;
pub mod prime;
pub mod s_sparse;
pub mod sampler;

pub use hash::HashFunction;
pub use one_sparse::OneSparseRecoverer;
pub use s_sparse::SSparseRecoverer;
pub use sampler::L0Sampler;

/// Coordinate of the sketched vector.
pub type Index = u64;
/// Signed entry of the sketched vector.
pub type Value = i64;

/// `a * b mod m` without overflowing.
pub fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

/// `a + b mod m` for `a, b < m` without overflowing.
pub fn add_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 + b as u128) % m as u128) as u64
}

/// `base^exp mod m` by repeated squaring.
pub fn pow_mod(base: u64, mut exp: u64, m: u64) -> u64 {
    if m == 1 {
        return 0;
    }
    let mut base = base % m;
    let mut result = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Maps a signed value into `[0, m)`.
pub(crate) fn to_field(value: Value, m: u64) -> u64 {
    (value as i128).rem_euclid(m as i128) as u64
}

/// `1 - 2 * ceil(log2(x))`, the repetition count that drives a failure
/// probability below `x`.
pub(crate) fn repetitions_for(x: f64) -> usize {
    (1 - 2 * (x.log2().ceil() as i64)).max(1) as usize
}

//! Prime search for the fields the sketches hash and fingerprint over.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};

/// bound -> smallest prime >= 4 * bound. Only ever grows.
static PRIME_CACHE: Mutex<BTreeMap<u64, u64>> = Mutex::new(BTreeMap::new());

/// Trial division by 2 and then odd divisors up to sqrt(value).
pub fn is_prime(value: u64) -> bool {
    if value < 2 {
        return false;
    }
    if value % 2 == 0 {
        return value == 2;
    }
    let mut step = 3u64;
    while step.saturating_mul(step) <= value {
        if value % step == 0 {
            return false;
        }
        step += 2;
    }
    true
}

/// Smallest prime >= `value`.
pub fn next_prime(mut value: u64) -> Result<u64> {
    while !is_prime(value) {
        value = value
            .checked_add(1)
            .ok_or_else(|| Error::overflow("next prime"))?;
    }
    Ok(value)
}

/// Smallest prime >= `4 * bound`, memoized for the lifetime of the process.
pub fn prime_above_4x(bound: u64) -> Result<u64> {
    if let Some(&p) = cache().get(&bound) {
        return Ok(p);
    }
    let start = bound
        .checked_mul(4)
        .ok_or_else(|| Error::overflow("prime search bound"))?;
    // Searched without holding the lock; racing searches agree on the answer.
    let p = next_prime(start)?;
    log::trace!("prime above 4 * {bound} is {p}");
    cache().insert(bound, p);
    Ok(p)
}

fn cache() -> std::sync::MutexGuard<'static, BTreeMap<u64, u64>> {
    PRIME_CACHE.lock().unwrap_or_else(PoisonError::into_inner)
}

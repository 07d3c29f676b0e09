use std::collections::{BTreeMap, BTreeSet};

use common::init_logger;
use dynamic_connectivity::l0_sampling::*;
use rand::prelude::*;
use scopeguard::{OnUnwind, ScopeGuard};

mod common;

fn guard<T: std::fmt::Debug>(t: T) -> ScopeGuard<T, impl FnOnce(T), OnUnwind> {
    scopeguard::guard_on_unwind(t, |t| log::error!("Crash with {t:?}"))
}

fn sorted(mut v: Vec<(Index, Value)>) -> Vec<(Index, Value)> {
    v.sort();
    v
}

/// Adds and removes random entries so that they cancel out.
fn noise(r: &mut SSparseRecoverer, rng: &mut impl Rng, size: u64) {
    for _ in 0..100 {
        let index = rng.gen_range(0..size);
        let value = rng.gen_range(1..=25);
        r.update(index, value);
        r.update(index, -value);
    }
}

#[test]
fn s_sparse_empty() {
    let r = SSparseRecoverer::new(100, 5, 0.01, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(!r.touched());
    assert!(r.recover().is_empty());
}

#[test]
fn s_sparse_single_with_noise() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(2);
    let mut r = guard(SSparseRecoverer::new(100, 5, 0.01, &mut rng).unwrap());
    r.update(17, 42);
    noise(&mut r, &mut rng, 100);
    assert!(r.touched());
    assert_eq!(r.recover(), vec![(17, 42)]);
}

#[test]
fn s_sparse_full_capacity() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut r = guard(SSparseRecoverer::new(100, 5, 0.01, &mut rng).unwrap());
    let updates = [(17, 42), (18, 43), (19, 44), (20, 45), (21, 46)];
    for (i, v) in updates {
        r.update(i, v);
    }
    noise(&mut r, &mut rng, 100);
    assert_eq!(sorted(r.recover()), updates);
}

#[test]
fn s_sparse_cancellation() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut r = SSparseRecoverer::new(1000, 4, 0.05, &mut rng).unwrap();
    let entries: Vec<(Index, Value)> = (0..30)
        .map(|_| (rng.gen_range(0..1000), rng.gen_range(-9..=9)))
        .collect();
    for &(i, v) in &entries {
        r.update(i, v);
    }
    for &(i, v) in entries.iter().rev() {
        r.update(i, -v);
    }
    assert!(r.touched());
    assert!(r.is_empty());
    assert!(r.recover().is_empty());
}

#[test]
fn s_sparse_statistical_completeness() {
    init_logger();
    const TRIALS: usize = 40;
    const S: usize = 6;
    let mut rng = StdRng::seed_from_u64(5);
    let mut failures = 0;
    for _ in 0..TRIALS {
        let mut r = SSparseRecoverer::new(500, S, 0.05, &mut rng).unwrap();
        let mut expected = BTreeMap::new();
        let count = rng.gen_range(1..=S);
        while expected.len() < count {
            expected.insert(rng.gen_range(0..500), rng.gen_range(1..100));
        }
        for (&i, &v) in &expected {
            r.update(i, v);
        }
        let got: BTreeMap<Index, Value> = r.recover().into_iter().collect();
        if got != expected {
            log::info!("Missed: expected {expected:?} got {got:?}");
            failures += 1;
        }
    }
    // Each trial fails with probability at most 0.05.
    assert!(failures <= 6, "{failures} failures out of {TRIALS}");
}

#[test]
fn s_sparse_additivity() {
    let mut rng = StdRng::seed_from_u64(6);
    let proto = SSparseRecoverer::new(200, 5, 0.01, &mut rng).unwrap();
    let (mut a, mut b, mut both) = (proto.clone(), proto.clone(), proto);
    let x = [(3, 1), (50, -2), (120, 7)];
    let y = [(50, 2), (60, 4), (199, -1)];
    for (i, v) in x {
        a.update(i, v);
        both.update(i, v);
    }
    for (i, v) in y {
        b.update(i, v);
        both.update(i, v);
    }
    let sum = a + b;
    let expected = vec![(3, 1), (60, 4), (120, 7), (199, -1)];
    assert_eq!(sorted(sum.recover()), expected);
    assert_eq!(sorted(both.recover()), expected);
    assert_eq!(sum.updates(), both.updates());
}

#[test]
fn sampler_empty() {
    let r = L0Sampler::new(100, 0.01, &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(r.sample(&mut StdRng::seed_from_u64(0)), None);
}

#[test]
fn sampler_returns_surviving_entries() {
    init_logger();
    const SIZE: u64 = 20;
    let mut rng = StdRng::seed_from_u64(8);
    let mut samplers: Vec<_> = (0..10)
        .map(|_| L0Sampler::new(SIZE, 0.01, &mut rng).unwrap())
        .collect();
    let mut vals = vec![0; SIZE as usize];
    for _ in 0..SIZE {
        let index = rng.gen_range(0..SIZE);
        let value = rng.gen_range(-5..=5);
        vals[index as usize] += value;
        for r in &mut samplers {
            r.update(index, value);
        }
    }
    // Clear every odd coordinate.
    for i in (1..SIZE).step_by(2) {
        let value = std::mem::take(&mut vals[i as usize]);
        if value != 0 {
            for r in &mut samplers {
                r.update(i, -value);
            }
        }
    }
    let any_left = vals.iter().any(|&v| v != 0);
    for r in &samplers {
        let r = guard(r);
        match r.sample(&mut rng) {
            Some((i, v)) => {
                assert_eq!(i % 2, 0);
                assert_ne!(v, 0);
                assert_eq!(v, vals[i as usize]);
            }
            None => assert!(!any_left, "sampler found nothing in {vals:?}"),
        }
    }
}

#[test]
fn sampler_spreads_over_support() {
    let mut rng = StdRng::seed_from_u64(9);
    let support: Vec<Index> = (0..12).map(|i| 7 * i + 3).collect();
    let mut seen = BTreeSet::new();
    for _ in 0..25 {
        let mut r = L0Sampler::new(100, 0.1, &mut rng).unwrap();
        for &i in &support {
            r.update(i, 1);
        }
        let (i, v) = r.sample(&mut rng).unwrap();
        assert!(support.contains(&i));
        assert_eq!(v, 1);
        seen.insert(i);
    }
    assert!(seen.len() > 3, "{seen:?}");
}

#[test]
fn sampler_sum_cancels_shared_entries() {
    let mut rng = StdRng::seed_from_u64(10);
    let proto = L0Sampler::new(64, 0.05, &mut rng).unwrap();
    let (mut a, mut b) = (proto.clone(), proto.clone());
    // An edge 9 inside {a, b} and an edge 33 leaving it.
    a.update(9, 1);
    b.update(9, -1);
    b.update(33, 1);
    assert!(a.is_compatible(&b));
    for _ in 0..10 {
        assert_eq!((a.clone() + b.clone()).sample(&mut rng), Some((33, 1)));
    }
    let mut c = proto;
    c += &a;
    c += &b;
    assert_eq!(c.sample(&mut rng), Some((33, 1)));
}

#[test]
#[should_panic]
fn sampler_sum_of_unrelated_panics() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = L0Sampler::new(64, 0.1, &mut rng).unwrap();
    let b = L0Sampler::new(64, 0.1, &mut rng).unwrap();
    let _ = a + b;
}

#[test]
fn same_seed_same_samples() {
    let build = || {
        let mut rng = StdRng::seed_from_u64(12);
        let mut r = L0Sampler::new(100, 0.1, &mut rng).unwrap();
        for i in 0..40 {
            r.update(i * 2, 1);
        }
        (0..5).map(|_| r.sample(&mut rng)).collect::<Vec<_>>()
    };
    assert_eq!(build(), build());
}

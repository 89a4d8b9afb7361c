//! Algebraic properties every dispatched kernel must satisfy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simdist_core::{binary, f16, vecf16, vecf32};

fn random_f32(rng: &mut StdRng, n: usize) -> Vec<f32> {
    (0..n).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn tolerance(n: usize, magnitude: f32) -> f32 {
    1e-5 * (1.0 + magnitude) * (1.0 + (n as f32).sqrt())
}

#[test]
fn test_dot_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in [0, 1, 3, 15, 16, 17, 63, 64, 65, 300, 1031] {
        let a = random_f32(&mut rng, n);
        let b = random_f32(&mut rng, n);
        let ab = vecf32::dot(&a, &b);
        let ba = vecf32::dot(&b, &a);
        assert!((ab - ba).abs() <= tolerance(n, ab.abs()), "n={n}: {ab} vs {ba}");
    }
}

#[test]
fn test_sl2_of_self_is_zero() {
    let mut rng = StdRng::seed_from_u64(11);
    for n in [0, 1, 7, 8, 9, 33, 129, 768] {
        let a = random_f32(&mut rng, n);
        assert_eq!(vecf32::sl2(&a, &a), 0.0, "n={n}");

        let h: Vec<f16> = a.iter().copied().map(f16::from_f32).collect();
        assert_eq!(vecf16::sl2(&h, &h), 0.0, "n={n}");
    }
}

#[test]
fn test_sl2_is_never_negative() {
    let mut rng = StdRng::seed_from_u64(13);
    for n in [1, 5, 31, 32, 100] {
        let a = random_f32(&mut rng, n);
        let b = random_f32(&mut rng, n);
        assert!(vecf32::sl2(&a, &b) >= 0.0);
    }
}

#[test]
fn test_cosine_of_self_is_one() {
    let mut rng = StdRng::seed_from_u64(17);
    for n in [1, 2, 15, 16, 17, 255, 1536] {
        let a = random_f32(&mut rng, n);
        assert!((vecf32::cosine(&a, &a) - 1.0).abs() < 1e-4, "n={n}");

        let h: Vec<f16> = a.iter().copied().map(f16::from_f32).collect();
        assert!((vecf16::cosine(&h, &h) - 1.0).abs() < 1e-2, "n={n}");
    }
}

#[test]
fn test_sum_sq_matches_self_dot() {
    let mut rng = StdRng::seed_from_u64(19);
    for n in [0, 4, 9, 40, 513] {
        let a = random_f32(&mut rng, n);
        let dot = vecf32::dot(&a, &a);
        let sum_sq = vecf32::sum_sq(&a);
        assert!((dot - sum_sq).abs() <= tolerance(n, dot), "n={n}");
    }
}

#[test]
fn test_min_max_ignores_padding() {
    // All-positive and all-negative inputs expose zero-filled padding lanes.
    for n in 1..70 {
        let pos: Vec<f32> = (0..n).map(|i| 1.0 + i as f32).collect();
        assert_eq!(vecf32::min_max(&pos), (1.0, n as f32), "n={n}");

        let neg: Vec<f32> = pos.iter().map(|v| -v).collect();
        assert_eq!(vecf32::min_max(&neg), (-(n as f32), -1.0), "n={n}");

        let neg16: Vec<f16> = neg.iter().copied().map(f16::from_f32).collect();
        assert_eq!(vecf16::min_max(&neg16), (-(n as f32), -1.0), "n={n}");
    }
}

#[test]
fn test_binary_identities() {
    let mut rng = StdRng::seed_from_u64(23);
    for n in [1, 3, 7, 9, 17, 100] {
        let a: Vec<u64> = (0..n).map(|_| rng.random()).collect();
        let b: Vec<u64> = (0..n).map(|_| rng.random()).collect();
        // |a| + |b| == |a & b| + |a | b|
        assert_eq!(
            binary::cnt(&a) + binary::cnt(&b),
            binary::dot(&a, &b) + binary::or_count(&a, &b)
        );
        // |a ^ b| == |a | b| - |a & b|
        assert_eq!(
            binary::sl2(&a, &b),
            binary::or_count(&a, &b) - binary::dot(&a, &b)
        );
        assert_eq!(binary::sl2(&a, &a), 0.0);
    }
}

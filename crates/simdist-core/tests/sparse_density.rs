//! Sparse kernels against a naive all-pairs reference at varying overlap.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use simdist_core::{f16, sparse, vecf16};

/// Builds two sorted index sets of sizes `ln` and `rn` sharing about
/// `density` of the smaller one.
fn overlapping(rng: &mut StdRng, ln: usize, rn: usize, density: f64) -> (Vec<u32>, Vec<u32>) {
    let universe = 4 * (ln + rn) + 16;
    let shared = (ln.min(rn) as f64 * density).round() as usize;
    let pool = sample(rng, universe, ln + rn - shared).into_vec();
    let (common, rest) = pool.split_at(shared);
    let (lonly, ronly) = rest.split_at(ln - shared);

    let mut left: Vec<u32> = common.iter().chain(lonly).map(|&i| i as u32).collect();
    let mut right: Vec<u32> = common.iter().chain(ronly).map(|&i| i as u32).collect();
    left.sort_unstable();
    right.sort_unstable();
    (left, right)
}

fn values(rng: &mut StdRng, n: usize) -> Vec<f32> {
    (0..n).map(|_| rng.random_range(-2.0..2.0)).collect()
}

fn naive_dot(li: &[u32], lv: &[f32], ri: &[u32], rv: &[f32]) -> f32 {
    let mut sum = 0.0;
    for (i, &l) in li.iter().enumerate() {
        for (j, &r) in ri.iter().enumerate() {
            if l == r {
                sum += lv[i] * rv[j];
            }
        }
    }
    sum
}

fn naive_sl2(li: &[u32], lv: &[f32], ri: &[u32], rv: &[f32]) -> f32 {
    let partner = |idx: u32, other: &[u32]| other.iter().position(|&o| o == idx);
    let mut sum = 0.0;
    for (i, &l) in li.iter().enumerate() {
        let r = partner(l, ri).map_or(0.0, |j| rv[j]);
        sum += (lv[i] - r) * (lv[i] - r);
    }
    for (j, &r) in ri.iter().enumerate() {
        if partner(r, li).is_none() {
            sum += rv[j] * rv[j];
        }
    }
    sum
}

#[test]
fn test_density_sweep() {
    let mut rng = StdRng::seed_from_u64(0x5ba45e);
    for density in [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
        for (ln, rn) in [(1, 1), (5, 40), (16, 16), (17, 33), (300, 350), (64, 5)] {
            let (li, ri) = overlapping(&mut rng, ln, rn, density);
            let lv = values(&mut rng, ln);
            let rv = values(&mut rng, rn);

            let want = naive_dot(&li, &lv, &ri, &rv);
            let got = sparse::dot(&li, &lv, &ri, &rv);
            assert!(
                (got - want).abs() < 1e-3 * (1.0 + want.abs()),
                "dot density={density} {ln}x{rn}: {got} vs {want}"
            );

            let want = naive_sl2(&li, &lv, &ri, &rv);
            let got = sparse::sl2(&li, &lv, &ri, &rv);
            assert!(
                (got - want).abs() < 1e-3 * (1.0 + want.abs()),
                "sl2 density={density} {ln}x{rn}: {got} vs {want}"
            );
        }
    }
}

#[test]
fn test_disjoint_sets_have_zero_dot() {
    let mut rng = StdRng::seed_from_u64(3);
    for (ln, rn) in [(3, 3), (16, 48), (100, 7)] {
        let (li, ri) = overlapping(&mut rng, ln, rn, 0.0);
        let lv = values(&mut rng, ln);
        let rv = values(&mut rng, rn);
        assert_eq!(sparse::dot(&li, &lv, &ri, &rv), 0.0, "{ln}x{rn}");
    }
}

#[test]
fn test_self_dot_is_sum_sq() {
    let mut rng = StdRng::seed_from_u64(5);
    for n in [1, 15, 16, 17, 200] {
        let (idx, _) = overlapping(&mut rng, n, n, 1.0);
        let val = values(&mut rng, n);
        let sum_sq: f32 = val.iter().map(|v| v * v).sum();
        let dot = sparse::dot(&idx, &val, &idx, &val);
        assert!((dot - sum_sq).abs() < 1e-4 * (1.0 + sum_sq), "n={n}");
        assert!((sparse::cosine(&idx, &val, &idx, &val) - 1.0).abs() < 1e-5, "n={n}");
        assert_eq!(sparse::sl2(&idx, &val, &idx, &val), 0.0, "n={n}");
    }
}

#[test]
fn test_f16_values_follow_f32() {
    let mut rng = StdRng::seed_from_u64(9);
    let (li, ri) = overlapping(&mut rng, 120, 90, 0.5);
    let lv: Vec<f16> = values(&mut rng, 120).into_iter().map(f16::from_f32).collect();
    let rv: Vec<f16> = values(&mut rng, 90).into_iter().map(f16::from_f32).collect();
    let lw: Vec<f32> = lv.iter().map(|v| v.to_f32()).collect();
    let rw: Vec<f32> = rv.iter().map(|v| v.to_f32()).collect();

    let want = naive_dot(&li, &lw, &ri, &rw);
    let got = vecf16::sparse_dot(&li, &lv, &ri, &rv);
    assert!((got - want).abs() < 1e-3 * (1.0 + want.abs()), "{got} vs {want}");

    let want = naive_sl2(&li, &lw, &ri, &rw);
    let got = vecf16::sparse_sl2(&li, &lv, &ri, &rv);
    assert!((got - want).abs() < 1e-3 * (1.0 + want.abs()), "{got} vs {want}");
}

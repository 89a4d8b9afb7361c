//! Portable reference kernels.
//!
//! These back every operation on every target and define the results the
//! vector tiers are tested against. Sums run in index order with a single
//! f32 accumulator.

use std::cmp::Ordering;

use super::Element;

// ============================================================================
// Dense
// ============================================================================

pub(crate) fn sum<T: Element>(a: &[T]) -> f32 {
    a.iter().fold(0.0, |acc, &x| acc + x.widen())
}

pub(crate) fn abs_sum<T: Element>(a: &[T]) -> f32 {
    a.iter().fold(0.0, |acc, &x| acc + x.widen().abs())
}

pub(crate) fn sum_sq<T: Element>(a: &[T]) -> f32 {
    a.iter().fold(0.0, |acc, &x| {
        let x = x.widen();
        acc + x * x
    })
}

/// Smallest and largest element, or `(0.0, 0.0)` for an empty slice.
pub(crate) fn min_max<T: Element>(a: &[T]) -> (f32, f32) {
    let Some((first, rest)) = a.split_first() else {
        return (0.0, 0.0);
    };
    let first = first.widen();
    rest.iter().fold((first, first), |(min, max), &x| {
        let x = x.widen();
        (min.min(x), max.max(x))
    })
}

pub(crate) fn dot<T: Element>(a: &[T], b: &[T]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have equal length");
    a.iter()
        .zip(b)
        .fold(0.0, |acc, (&x, &y)| acc + x.widen() * y.widen())
}

/// `dot(a, b) / sqrt(sum_sq(a) * sum_sq(b))` in one pass.
pub(crate) fn cosine<T: Element>(a: &[T], b: &[T]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have equal length");
    let mut xy = 0.0f32;
    let mut xx = 0.0f32;
    let mut yy = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x.widen(), y.widen());
        xy += x * y;
        xx += x * x;
        yy += y * y;
    }
    xy / (xx * yy).sqrt()
}

pub(crate) fn sl2<T: Element>(a: &[T], b: &[T]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have equal length");
    a.iter().zip(b).fold(0.0, |acc, (&x, &y)| {
        let d = x.widen() - y.widen();
        acc + d * d
    })
}

// ============================================================================
// Binary
// ============================================================================

#[allow(clippy::cast_precision_loss)]
fn popcount(words: impl Iterator<Item = u64>) -> f32 {
    words.map(|w| u64::from(w.count_ones())).sum::<u64>() as f32
}

pub(crate) fn bit_cnt(a: &[u64]) -> f32 {
    popcount(a.iter().copied())
}

pub(crate) fn bit_dot(a: &[u64], b: &[u64]) -> f32 {
    assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
    popcount(a.iter().zip(b).map(|(x, y)| x & y))
}

pub(crate) fn bit_sl2(a: &[u64], b: &[u64]) -> f32 {
    assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
    popcount(a.iter().zip(b).map(|(x, y)| x ^ y))
}

pub(crate) fn bit_or_count(a: &[u64], b: &[u64]) -> f32 {
    assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
    popcount(a.iter().zip(b).map(|(x, y)| x | y))
}

pub(crate) fn bit_cosine(a: &[u64], b: &[u64]) -> f32 {
    assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
    let xy = bit_dot(a, b);
    let xx = bit_cnt(a);
    let yy = bit_cnt(b);
    xy / (xx * yy).sqrt()
}

pub(crate) fn bit_jaccard(a: &[u64], b: &[u64]) -> f32 {
    assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
    bit_dot(a, b) / bit_or_count(a, b)
}

// ============================================================================
// Sparse
// ============================================================================

/// Calls `f(lhs_pos, rhs_pos)` for every index present on both sides.
#[inline]
fn merge(lidx: &[u32], ridx: &[u32], mut f: impl FnMut(usize, usize)) {
    let (mut i, mut j) = (0, 0);
    while i < lidx.len() && j < ridx.len() {
        match lidx[i].cmp(&ridx[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                f(i, j);
                i += 1;
                j += 1;
            }
        }
    }
}

fn check_sparse<V>(lidx: &[u32], lval: &[V], ridx: &[u32], rval: &[V]) {
    assert_eq!(lidx.len(), lval.len(), "sparse indices and values must have equal length");
    assert_eq!(ridx.len(), rval.len(), "sparse indices and values must have equal length");
}

pub(crate) fn sparse_dot<V: Element>(lidx: &[u32], lval: &[V], ridx: &[u32], rval: &[V]) -> f32 {
    check_sparse(lidx, lval, ridx, rval);
    let mut xy = 0.0f32;
    merge(lidx, ridx, |i, j| xy += lval[i].widen() * rval[j].widen());
    xy
}

pub(crate) fn sparse_cosine<V: Element>(
    lidx: &[u32],
    lval: &[V],
    ridx: &[u32],
    rval: &[V],
) -> f32 {
    let xy = sparse_dot(lidx, lval, ridx, rval);
    xy / (sum_sq(lval) * sum_sq(rval)).sqrt()
}

/// Squared distance where an index missing on one side counts as zero.
pub(crate) fn sparse_sl2<V: Element>(lidx: &[u32], lval: &[V], ridx: &[u32], rval: &[V]) -> f32 {
    check_sparse(lidx, lval, ridx, rval);
    let (mut i, mut j) = (0, 0);
    let mut d2 = 0.0f32;
    while i < lidx.len() && j < ridx.len() {
        match lidx[i].cmp(&ridx[j]) {
            Ordering::Less => {
                let x = lval[i].widen();
                d2 += x * x;
                i += 1;
            }
            Ordering::Greater => {
                let y = rval[j].widen();
                d2 += y * y;
                j += 1;
            }
            Ordering::Equal => {
                let d = lval[i].widen() - rval[j].widen();
                d2 += d * d;
                i += 1;
                j += 1;
            }
        }
    }
    d2 + sum_sq(&lval[i..]) + sum_sq(&rval[j..])
}

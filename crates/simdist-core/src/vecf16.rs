//! Dense half-precision reductions and f16-valued sparse metrics.
//!
//! Inputs are widened to f32 and accumulated in f32 on every tier except the
//! AVX-512 FP16 one, which accumulates in native half lanes and is therefore
//! less precise on long vectors.

use half::f16;

use crate::dispatch::table;

/// Sum of all elements.
#[inline]
#[must_use]
pub fn sum(a: &[f16]) -> f32 {
    (table().f16.sum.kernel)(a)
}

/// Sum of absolute values.
#[inline]
#[must_use]
pub fn abs_sum(a: &[f16]) -> f32 {
    (table().f16.abs_sum.kernel)(a)
}

/// Sum of squares.
#[inline]
#[must_use]
pub fn sum_sq(a: &[f16]) -> f32 {
    (table().f16.sum_sq.kernel)(a)
}

/// Smallest and largest element, `(0.0, 0.0)` when empty.
#[inline]
#[must_use]
pub fn min_max(a: &[f16]) -> (f32, f32) {
    (table().f16.min_max.kernel)(a)
}

/// Inner product.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn dot(a: &[f16], b: &[f16]) -> f32 {
    (table().f16.dot.kernel)(a, b)
}

/// Cosine similarity. A zero vector yields NaN.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn cosine(a: &[f16], b: &[f16]) -> f32 {
    (table().f16.cosine.kernel)(a, b)
}

/// Squared Euclidean distance.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn sl2(a: &[f16], b: &[f16]) -> f32 {
    (table().f16.sl2.kernel)(a, b)
}

/// Inner product of two sparse vectors with f16 values.
///
/// Indices must be strictly increasing; see [`crate::sparse`].
///
/// # Panics
///
/// Panics if either side has different numbers of indices and values.
#[inline]
#[must_use]
pub fn sparse_dot(lidx: &[u32], lval: &[f16], ridx: &[u32], rval: &[f16]) -> f32 {
    (table().sparse_f16.dot.kernel)(lidx, lval, ridx, rval)
}

/// Cosine similarity of two sparse vectors with f16 values.
///
/// # Panics
///
/// Panics if either side has different numbers of indices and values.
#[inline]
#[must_use]
pub fn sparse_cosine(lidx: &[u32], lval: &[f16], ridx: &[u32], rval: &[f16]) -> f32 {
    (table().sparse_f16.cosine.kernel)(lidx, lval, ridx, rval)
}

/// Squared distance of two sparse vectors with f16 values.
///
/// # Panics
///
/// Panics if either side has different numbers of indices and values.
#[inline]
#[must_use]
pub fn sparse_sl2(lidx: &[u32], lval: &[f16], ridx: &[u32], rval: &[f16]) -> f32 {
    (table().sparse_f16.sl2.kernel)(lidx, lval, ridx, rval)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halves(values: &[f32]) -> Vec<f16> {
        values.iter().copied().map(f16::from_f32).collect()
    }

    #[test]
    fn test_small_vectors() {
        let a = halves(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = halves(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert!((dot(&a, &b) - 35.0).abs() < 1e-2);
        assert!((sl2(&a, &b) - 40.0).abs() < 1e-2);
        assert!((cosine(&a, &b) - 35.0 / 55.0).abs() < 1e-3);
        assert!((sum(&a) - 15.0).abs() < 1e-3);
        assert_eq!(min_max(&a), (1.0, 5.0));
    }

    #[test]
    fn test_abs_sum_and_sum_sq() {
        let a = halves(&[-1.5, 0.5, -2.0, 3.0]);
        assert!((abs_sum(&a) - 7.0).abs() < 1e-3);
        assert!((sum_sq(&a) - 15.5).abs() < 1e-3);
    }

    #[test]
    fn test_sparse_f16() {
        let lv = halves(&[1.0, 2.0, 3.0]);
        let rv = halves(&[4.0, 5.0]);
        let (li, ri) = ([1u32, 4, 9], [4u32, 9]);
        assert!((sparse_dot(&li, &lv, &ri, &rv) - 23.0).abs() < 1e-3);
        // 1^2 + (2-4)^2 + (3-5)^2
        assert!((sparse_sl2(&li, &lv, &ri, &rv) - 9.0).abs() < 1e-3);
        let expected = 23.0 / (14.0f32 * 41.0).sqrt();
        assert!((sparse_cosine(&li, &lv, &ri, &rv) - expected).abs() < 1e-4);
    }
}

//! Dense single-precision reductions.
//!
//! Each function calls the kernel the process-wide dispatch table selected.
//! Pairwise functions panic if the operands differ in length; use
//! [`crate::checked`] for a `Result` instead.

use crate::dispatch::table;

/// Sum of all elements.
#[inline]
#[must_use]
pub fn sum(a: &[f32]) -> f32 {
    (table().f32.sum.kernel)(a)
}

/// Sum of absolute values.
#[inline]
#[must_use]
pub fn abs_sum(a: &[f32]) -> f32 {
    (table().f32.abs_sum.kernel)(a)
}

/// Sum of squares.
#[inline]
#[must_use]
pub fn sum_sq(a: &[f32]) -> f32 {
    (table().f32.sum_sq.kernel)(a)
}

/// Smallest and largest element, `(0.0, 0.0)` when empty.
#[inline]
#[must_use]
pub fn min_max(a: &[f32]) -> (f32, f32) {
    (table().f32.min_max.kernel)(a)
}

/// Inner product.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    (table().f32.dot.kernel)(a, b)
}

/// Cosine similarity, `dot(a, b) / sqrt(sum_sq(a) * sum_sq(b))`.
///
/// A zero vector yields NaN.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    (table().f32.cosine.kernel)(a, b)
}

/// Squared Euclidean distance.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn sl2(a: &[f32], b: &[f32]) -> f32 {
    (table().f32.sl2.kernel)(a, b)
}

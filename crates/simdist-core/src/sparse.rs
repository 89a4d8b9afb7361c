//! Sparse vector metrics with f32 values.
//!
//! A sparse vector is given as a strictly increasing index array and a value
//! array of the same length; dimensions not listed are zero. Increasing order
//! is a precondition these functions do not check. Violating it gives an
//! unspecified result but never reads out of bounds. The index/value lengths
//! are checked and a mismatch panics.
//!
//! f16-valued variants live in [`crate::vecf16`].

use simdist_common::SparseSlice;

use crate::dispatch::table;

/// Inner product over the shared indices.
///
/// # Panics
///
/// Panics if either side has different numbers of indices and values.
#[inline]
#[must_use]
pub fn dot(lidx: &[u32], lval: &[f32], ridx: &[u32], rval: &[f32]) -> f32 {
    (table().sparse_f32.dot.kernel)(lidx, lval, ridx, rval)
}

/// Cosine similarity; NaN if either side has no nonzero value.
///
/// # Panics
///
/// Panics if either side has different numbers of indices and values.
#[inline]
#[must_use]
pub fn cosine(lidx: &[u32], lval: &[f32], ridx: &[u32], rval: &[f32]) -> f32 {
    (table().sparse_f32.cosine.kernel)(lidx, lval, ridx, rval)
}

/// Squared Euclidean distance; an index missing on one side counts as zero.
///
/// # Panics
///
/// Panics if either side has different numbers of indices and values.
#[inline]
#[must_use]
pub fn sl2(lidx: &[u32], lval: &[f32], ridx: &[u32], rval: &[f32]) -> f32 {
    (table().sparse_f32.sl2.kernel)(lidx, lval, ridx, rval)
}

/// [`dot`] over two validated views.
#[inline]
#[must_use]
pub fn dot_slices(lhs: SparseSlice<'_, f32>, rhs: SparseSlice<'_, f32>) -> f32 {
    dot(lhs.indices(), lhs.values(), rhs.indices(), rhs.values())
}

//! Popcount metrics over bit-packed `u64` words.
//!
//! Lengths are in words. Bits past the logical length of the final word must
//! be zero; [`BitVector`](simdist_common::BitVector) and
//! [`BitVector::mask_trailing`](simdist_common::BitVector::mask_trailing)
//! help meet that. The result is returned as `f32` so every metric shares
//! one signature; counts are exact up to 2^24.

use crate::dispatch::table;

/// Number of set bits.
#[inline]
#[must_use]
pub fn cnt(a: &[u64]) -> f32 {
    (table().binary.cnt.kernel)(a)
}

/// Number of bits set in both, `popcount(a & b)`.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn dot(a: &[u64], b: &[u64]) -> f32 {
    (table().binary.dot.kernel)(a, b)
}

/// Hamming distance, `popcount(a ^ b)`.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn sl2(a: &[u64], b: &[u64]) -> f32 {
    (table().binary.sl2.kernel)(a, b)
}

/// `dot(a, b) / sqrt(cnt(a) * cnt(b))`, NaN if either is all zeros.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn cosine(a: &[u64], b: &[u64]) -> f32 {
    (table().binary.cosine.kernel)(a, b)
}

/// Number of bits set in either, `popcount(a | b)`.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn or_count(a: &[u64], b: &[u64]) -> f32 {
    (table().binary.or_count.kernel)(a, b)
}

/// Intersection over union, NaN if both are all zeros.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
#[must_use]
pub fn jaccard(a: &[u64], b: &[u64]) -> f32 {
    (table().binary.jaccard.kernel)(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word() {
        let a = [0b1010];
        let b = [0b1100];
        assert_eq!(dot(&a, &b), 1.0);
        assert_eq!(sl2(&a, &b), 2.0);
        assert_eq!(cnt(&a), 2.0);
        assert_eq!(or_count(&a, &b), 3.0);
        assert!((cosine(&a, &b) - 0.5).abs() < 1e-6);
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_identical_vectors() {
        let a: Vec<u64> = (0..19).map(|i| 0x9e37_79b9_7f4a_7c15u64.rotate_left(i)).collect();
        assert_eq!(sl2(&a, &a), 0.0);
        assert_eq!(dot(&a, &a), cnt(&a));
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-6);
        assert!((jaccard(&a, &a) - 1.0).abs() < 1e-6);
    }
}

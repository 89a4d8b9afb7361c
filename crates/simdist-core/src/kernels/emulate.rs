//! Horizontal reductions and instruction emulation for x86-64 tiers.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

// ============================================================================
// 128-bit reductions (v2)
// ============================================================================

/// Sums the four lanes of `v`.
#[target_feature(enable = "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt")]
#[inline]
pub(crate) unsafe fn reduce_add_m128(v: __m128) -> f32 {
    let shuf = _mm_movehdup_ps(v);
    let sums = _mm_add_ps(v, shuf);
    let shuf = _mm_movehl_ps(sums, sums);
    let sums = _mm_add_ss(sums, shuf);
    _mm_cvtss_f32(sums)
}

/// Minimum of the four lanes of `v`.
#[target_feature(enable = "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt")]
#[inline]
pub(crate) unsafe fn reduce_min_m128(v: __m128) -> f32 {
    let v = _mm_min_ps(v, _mm_movehl_ps(v, v));
    let v = _mm_min_ss(v, _mm_shuffle_ps::<1>(v, v));
    _mm_cvtss_f32(v)
}

/// Maximum of the four lanes of `v`.
#[target_feature(enable = "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt")]
#[inline]
pub(crate) unsafe fn reduce_max_m128(v: __m128) -> f32 {
    let v = _mm_max_ps(v, _mm_movehl_ps(v, v));
    let v = _mm_max_ss(v, _mm_shuffle_ps::<1>(v, v));
    _mm_cvtss_f32(v)
}

// ============================================================================
// 256-bit reductions (v3)
// ============================================================================

/// Sums the eight lanes of `v`.
#[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
#[inline]
pub(crate) unsafe fn reduce_add_m256(v: __m256) -> f32 {
    let v = _mm256_add_ps(v, _mm256_permute2f128_ps::<1>(v, v));
    let v = _mm256_hadd_ps(v, v);
    let v = _mm256_hadd_ps(v, v);
    _mm256_cvtss_f32(v)
}

/// Minimum of the eight lanes of `v`.
#[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
#[inline]
pub(crate) unsafe fn reduce_min_m256(v: __m256) -> f32 {
    let lo = _mm256_castps256_ps128(v);
    let hi = _mm256_extractf128_ps::<1>(v);
    reduce_min_m128(_mm_min_ps(lo, hi))
}

/// Maximum of the eight lanes of `v`.
#[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
#[inline]
pub(crate) unsafe fn reduce_max_m256(v: __m256) -> f32 {
    let lo = _mm256_castps256_ps128(v);
    let hi = _mm256_extractf128_ps::<1>(v);
    reduce_max_m128(_mm_max_ps(lo, hi))
}

// ============================================================================
// VP2INTERSECT (v4)
// ============================================================================

/// Two-way intersection of sixteen 32-bit lanes.
///
/// Returns `(mask_a, mask_b)`: bit `i` of `mask_a` is set when `a[i]` occurs
/// anywhere in `b`, and likewise for `mask_b`. Matches the native
/// `vp2intersectd` result using four rotations of `a` against four in-lane
/// shuffles of `b` (Díez-Cañas, arXiv:2112.06342).
#[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl")]
#[inline]
pub(crate) unsafe fn mm512_2intersect_epi32(a: __m512i, b: __m512i) -> (__mmask16, __mmask16) {
    let a1 = _mm512_alignr_epi32::<4>(a, a);
    let a2 = _mm512_alignr_epi32::<8>(a, a);
    let a3 = _mm512_alignr_epi32::<12>(a, a);
    let b1 = _mm512_shuffle_epi32::<_MM_PERM_ADCB>(b);
    let b2 = _mm512_shuffle_epi32::<_MM_PERM_BADC>(b);
    let b3 = _mm512_shuffle_epi32::<_MM_PERM_CBAD>(b);

    let m00 = _mm512_cmpeq_epi32_mask(a, b);
    let m01 = _mm512_cmpeq_epi32_mask(a, b1);
    let m02 = _mm512_cmpeq_epi32_mask(a, b2);
    let m03 = _mm512_cmpeq_epi32_mask(a, b3);
    let m10 = _mm512_cmpeq_epi32_mask(a1, b);
    let m11 = _mm512_cmpeq_epi32_mask(a1, b1);
    let m12 = _mm512_cmpeq_epi32_mask(a1, b2);
    let m13 = _mm512_cmpeq_epi32_mask(a1, b3);
    let m20 = _mm512_cmpeq_epi32_mask(a2, b);
    let m21 = _mm512_cmpeq_epi32_mask(a2, b1);
    let m22 = _mm512_cmpeq_epi32_mask(a2, b2);
    let m23 = _mm512_cmpeq_epi32_mask(a2, b3);
    let m30 = _mm512_cmpeq_epi32_mask(a3, b);
    let m31 = _mm512_cmpeq_epi32_mask(a3, b1);
    let m32 = _mm512_cmpeq_epi32_mask(a3, b2);
    let m33 = _mm512_cmpeq_epi32_mask(a3, b3);

    // Lanes of b matched per shuffle, summed over every rotation of a.
    let m0 = m00 | m10 | m20 | m30;
    let m1 = m01 | m11 | m21 | m31;
    let m2 = m02 | m12 | m22 | m32;
    let m3 = m03 | m13 | m23 | m33;

    let mask_a = m00
        | m01
        | m02
        | m03
        | (m10 | m11 | m12 | m13).rotate_left(4)
        | (m20 | m21 | m22 | m23).rotate_left(8)
        | (m30 | m31 | m32 | m33).rotate_right(4);

    let mask_b = m0
        | ((0x7777 & m1) << 1)
        | ((m1 >> 3) & 0x1111)
        | ((0x3333 & m2) << 2)
        | ((m2 >> 2) & 0x3333)
        | ((0x1111 & m3) << 3)
        | ((m3 >> 1) & 0x7777);

    (mask_a, mask_b)
}

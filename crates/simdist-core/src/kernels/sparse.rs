//! Sparse intersection kernels.
//!
//! A sparse vector is a strictly increasing `u32` index array with a parallel
//! value array. Every operation walks the two index arrays as a merge join,
//! so the cost is linear in the total number of non-zeros.
//!
//! The AVX-512 tier merges sixteen indices per side at a time. Each step
//! intersects the two blocks, compresses the matched values of each side to
//! the front of a register (matches line up because both sides are sorted),
//! accumulates, and then advances whichever block ends on the smaller index.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use half::f16;

use super::{SparseKernel, scalar};
use crate::dispatch::{Capabilities, SparseTable};

/// Resolves the sparse kernels with f32 values for `caps`.
pub(crate) fn table_f32(caps: Capabilities) -> SparseTable<f32> {
    SparseTable {
        dot: select!(caps, SparseKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::dot_f32,
            _ => scalar::sparse_dot::<f32>,
        ),
        cosine: select!(caps, SparseKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::cosine_f32,
            _ => scalar::sparse_cosine::<f32>,
        ),
        sl2: select!(caps, SparseKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::sl2_f32,
            _ => scalar::sparse_sl2::<f32>,
        ),
    }
}

/// Resolves the sparse kernels with f16 values for `caps`.
pub(crate) fn table_f16(caps: Capabilities) -> SparseTable<f16> {
    SparseTable {
        dot: select!(caps, SparseKernel<f16>;
            #[cfg(target_arch = "x86_64")] V4 => v4::dot_f16,
            _ => scalar::sparse_dot::<f16>,
        ),
        cosine: select!(caps, SparseKernel<f16>;
            #[cfg(target_arch = "x86_64")] V4 => v4::cosine_f16,
            _ => scalar::sparse_cosine::<f16>,
        ),
        sl2: select!(caps, SparseKernel<f16>;
            #[cfg(target_arch = "x86_64")] V4 => v4::sl2_f16,
            _ => scalar::sparse_sl2::<f16>,
        ),
    }
}

#[cfg(target_arch = "x86_64")]
mod v4 {
    use std::arch::x86_64::*;

    use half::f16;

    use crate::kernels::Element;
    use crate::kernels::emulate::mm512_2intersect_epi32;
    use crate::kernels::tail::lane_mask16;

    const BLOCK: usize = 16;

    /// Loads the values selected by `mask` as f32; other lanes are zero.
    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    #[inline]
    unsafe fn load_values<V: Element>(p: *const V, mask: __mmask16) -> __m512 {
        if V::HALF {
            _mm512_cvtph_ps(_mm256_maskz_loadu_epi16(mask, p.cast()))
        } else {
            _mm512_maskz_loadu_ps(mask, p.cast())
        }
    }

    /// Loads the indices selected by `mask`; other lanes repeat `last`.
    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    #[inline]
    unsafe fn load_indices(p: *const u32, mask: __mmask16, last: u32) -> __m512i {
        _mm512_mask_loadu_epi32(_mm512_set1_epi32(last.cast_signed()), mask, p.cast())
    }

    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn sum_sq<V: Element>(val: &[V]) -> f32 {
        let n = val.len();
        let p = val.as_ptr();
        let mut acc = _mm512_setzero_ps();
        let mut i = 0;
        while i < n {
            let x = load_values(p.add(i), lane_mask16((n - i).min(BLOCK)));
            acc = _mm512_fmadd_ps(x, x, acc);
            i += BLOCK;
        }
        _mm512_reduce_add_ps(acc)
    }

    /// Squares of `val[pos..]`, skipping the lanes of the first block in `seen`.
    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn rest_sq<V: Element>(val: &[V], pos: usize, seen: __mmask16) -> f32 {
        if pos >= val.len() {
            return 0.0;
        }
        let w = (val.len() - pos).min(BLOCK);
        let x = load_values(val.as_ptr().add(pos), lane_mask16(w) & !seen);
        _mm512_reduce_add_ps(_mm512_mul_ps(x, x)) + sum_sq(&val[pos + w..])
    }

    /// Merges both sides and sums over matched value pairs.
    ///
    /// Without `DIST` the sum is `l * r`. With `DIST` it is `(l - r)^2`, plus
    /// the square of every value whose index has no match; each block records
    /// its matched lanes in `seen` until it is retired. Every term is a
    /// square, so the distance never goes negative.
    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn intersect<V: Element, const DIST: bool>(
        lidx: &[u32],
        lval: &[V],
        ridx: &[u32],
        rval: &[V],
    ) -> f32 {
        assert_eq!(lidx.len(), lval.len(), "sparse indices and values must have equal length");
        assert_eq!(ridx.len(), rval.len(), "sparse indices and values must have equal length");
        let (ln, rn) = (lidx.len(), ridx.len());
        let (mut lp, mut rp) = (0, 0);
        let (mut lseen, mut rseen): (__mmask16, __mmask16) = (0, 0);
        let mut acc = _mm512_setzero_ps();
        while lp < ln && rp < rn {
            let lw = (ln - lp).min(BLOCK);
            let rw = (rn - rp).min(BLOCK);
            let (lmask, rmask) = (lane_mask16(lw), lane_mask16(rw));
            let lt = lidx[lp + lw - 1];
            let rt = ridx[rp + rw - 1];

            let li = load_indices(lidx.as_ptr().add(lp), lmask, lt);
            let ri = load_indices(ridx.as_ptr().add(rp), rmask, rt);
            let (lm, rm) = mm512_2intersect_epi32(li, ri);
            let (lm, rm) = (lm & lmask, rm & rmask);

            let lv = load_values(lval.as_ptr().add(lp), lmask);
            let rv = load_values(rval.as_ptr().add(rp), rmask);
            let l = _mm512_maskz_compress_ps(lm, lv);
            let r = _mm512_maskz_compress_ps(rm, rv);
            let (ladv, radv) = (lt <= rt, lt >= rt);
            acc = if DIST {
                lseen |= lm;
                rseen |= rm;
                let d = _mm512_sub_ps(l, r);
                let mut acc = _mm512_fmadd_ps(d, d, acc);
                if ladv {
                    let x = _mm512_maskz_mov_ps(lmask & !lseen, lv);
                    acc = _mm512_fmadd_ps(x, x, acc);
                }
                if radv {
                    let x = _mm512_maskz_mov_ps(rmask & !rseen, rv);
                    acc = _mm512_fmadd_ps(x, x, acc);
                }
                acc
            } else {
                _mm512_fmadd_ps(l, r, acc)
            };

            if ladv {
                lp += lw;
                lseen = 0;
            }
            if radv {
                rp += rw;
                rseen = 0;
            }
        }
        let matched = _mm512_reduce_add_ps(acc);
        if DIST {
            matched + rest_sq(lval, lp, lseen) + rest_sq(rval, rp, rseen)
        } else {
            matched
        }
    }

    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn dot<V: Element>(lidx: &[u32], lval: &[V], ridx: &[u32], rval: &[V]) -> f32 {
        intersect::<V, false>(lidx, lval, ridx, rval)
    }

    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn cosine<V: Element>(lidx: &[u32], lval: &[V], ridx: &[u32], rval: &[V]) -> f32 {
        let xy = intersect::<V, false>(lidx, lval, ridx, rval);
        xy / (sum_sq(lval) * sum_sq(rval)).sqrt()
    }

    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn sl2<V: Element>(lidx: &[u32], lval: &[V], ridx: &[u32], rval: &[V]) -> f32 {
        intersect::<V, true>(lidx, lval, ridx, rval)
    }

    entries! {
        dot_f32 => dot::<f32>(lidx: &[u32], lval: &[f32], ridx: &[u32], rval: &[f32]) -> f32;
        cosine_f32 => cosine::<f32>(lidx: &[u32], lval: &[f32], ridx: &[u32], rval: &[f32]) -> f32;
        sl2_f32 => sl2::<f32>(lidx: &[u32], lval: &[f32], ridx: &[u32], rval: &[f32]) -> f32;
        dot_f16 => dot::<f16>(lidx: &[u32], lval: &[f16], ridx: &[u32], rval: &[f16]) -> f32;
        cosine_f16 => cosine::<f16>(lidx: &[u32], lval: &[f16], ridx: &[u32], rval: &[f16]) -> f32;
        sl2_f16 => sl2::<f16>(lidx: &[u32], lval: &[f16], ridx: &[u32], rval: &[f16]) -> f32;
    }
}

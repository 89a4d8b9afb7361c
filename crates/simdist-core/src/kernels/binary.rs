//! Popcount kernels over bit-packed `u64` words.
//!
//! Only the AVX-512 vector popcount tier is written with intrinsics. Every
//! other tier is the same per-word `count_ones` loop compiled under that
//! tier's target features, which lets the compiler pick the popcount
//! strategy the tier supports (`popcnt` on x86-64, `cnt` on NEON, SVE `cnt`).
//!
//! Unused high bits of the final word must be zero; kernels do not mask them.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use super::{PairKernel, UnaryKernel, scalar};
use crate::dispatch::{BinaryTable, Capabilities};

/// Resolves the binary kernels for `caps`.
pub(crate) fn table(caps: Capabilities) -> BinaryTable {
    BinaryTable {
        cnt: select!(caps, UnaryKernel<u64>;
            #[cfg(target_arch = "aarch64")] Sve => sve::cnt,
            #[cfg(target_arch = "x86_64")] V4Vpopcntdq => v4_vpopcntdq::cnt,
            #[cfg(target_arch = "x86_64")] V4 => v4::cnt,
            #[cfg(target_arch = "x86_64")] V3 => v3::cnt,
            #[cfg(target_arch = "aarch64")] Neon => neon::cnt,
            #[cfg(target_arch = "x86_64")] V2 => v2::cnt,
            _ => scalar::bit_cnt,
        ),
        dot: select!(caps, PairKernel<u64>;
            #[cfg(target_arch = "aarch64")] Sve => sve::dot,
            #[cfg(target_arch = "x86_64")] V4Vpopcntdq => v4_vpopcntdq::dot,
            #[cfg(target_arch = "x86_64")] V4 => v4::dot,
            #[cfg(target_arch = "x86_64")] V3 => v3::dot,
            #[cfg(target_arch = "aarch64")] Neon => neon::dot,
            #[cfg(target_arch = "x86_64")] V2 => v2::dot,
            _ => scalar::bit_dot,
        ),
        sl2: select!(caps, PairKernel<u64>;
            #[cfg(target_arch = "aarch64")] Sve => sve::sl2,
            #[cfg(target_arch = "x86_64")] V4Vpopcntdq => v4_vpopcntdq::sl2,
            #[cfg(target_arch = "x86_64")] V4 => v4::sl2,
            #[cfg(target_arch = "x86_64")] V3 => v3::sl2,
            #[cfg(target_arch = "aarch64")] Neon => neon::sl2,
            #[cfg(target_arch = "x86_64")] V2 => v2::sl2,
            _ => scalar::bit_sl2,
        ),
        cosine: select!(caps, PairKernel<u64>;
            #[cfg(target_arch = "aarch64")] Sve => sve::cosine,
            #[cfg(target_arch = "x86_64")] V4Vpopcntdq => v4_vpopcntdq::cosine,
            #[cfg(target_arch = "x86_64")] V4 => v4::cosine,
            #[cfg(target_arch = "x86_64")] V3 => v3::cosine,
            #[cfg(target_arch = "aarch64")] Neon => neon::cosine,
            #[cfg(target_arch = "x86_64")] V2 => v2::cosine,
            _ => scalar::bit_cosine,
        ),
        or_count: select!(caps, PairKernel<u64>;
            #[cfg(target_arch = "x86_64")] V4Vpopcntdq => v4_vpopcntdq::or_count,
            _ => scalar::bit_or_count,
        ),
        jaccard: select!(caps, PairKernel<u64>;
            #[cfg(target_arch = "x86_64")] V4Vpopcntdq => v4_vpopcntdq::jaccard,
            _ => scalar::bit_jaccard,
        ),
    }
}

/// Defines a tier module of `count_ones` loops compiled with `$features`.
macro_rules! count_ones_tier {
    ($(#[$meta:meta])* $tier:ident, $features:tt) => {
        $(#[$meta])*
        mod $tier {
            #[target_feature(enable = $features)]
            #[allow(clippy::cast_precision_loss)]
            unsafe fn cnt_kernel(a: &[u64]) -> f32 {
                let mut count = 0u64;
                for &x in a {
                    count += u64::from(x.count_ones());
                }
                count as f32
            }

            #[target_feature(enable = $features)]
            #[allow(clippy::cast_precision_loss)]
            unsafe fn dot_kernel(a: &[u64], b: &[u64]) -> f32 {
                assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
                let mut count = 0u64;
                for (&x, &y) in a.iter().zip(b) {
                    count += u64::from((x & y).count_ones());
                }
                count as f32
            }

            #[target_feature(enable = $features)]
            #[allow(clippy::cast_precision_loss)]
            unsafe fn sl2_kernel(a: &[u64], b: &[u64]) -> f32 {
                assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
                let mut count = 0u64;
                for (&x, &y) in a.iter().zip(b) {
                    count += u64::from((x ^ y).count_ones());
                }
                count as f32
            }

            #[target_feature(enable = $features)]
            #[allow(clippy::cast_precision_loss)]
            unsafe fn cosine_kernel(a: &[u64], b: &[u64]) -> f32 {
                assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
                let (mut xy, mut xx, mut yy) = (0u64, 0u64, 0u64);
                for (&x, &y) in a.iter().zip(b) {
                    xy += u64::from((x & y).count_ones());
                    xx += u64::from(x.count_ones());
                    yy += u64::from(y.count_ones());
                }
                xy as f32 / (xx as f32 * yy as f32).sqrt()
            }

            entries! {
                cnt => cnt_kernel(a: &[u64]) -> f32;
                dot => dot_kernel(a: &[u64], b: &[u64]) -> f32;
                sl2 => sl2_kernel(a: &[u64], b: &[u64]) -> f32;
                cosine => cosine_kernel(a: &[u64], b: &[u64]) -> f32;
            }
        }
    };
}

count_ones_tier!(#[cfg(target_arch = "x86_64")] v2, "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt");
count_ones_tier!(#[cfg(target_arch = "x86_64")] v3, "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt");
count_ones_tier!(
    #[cfg(target_arch = "x86_64")]
    v4,
    "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt"
);
count_ones_tier!(#[cfg(target_arch = "aarch64")] neon, "neon");
count_ones_tier!(#[cfg(target_arch = "aarch64")] sve, "neon,sve");

// ============================================================================
// x86-64-v4 + AVX512VPOPCNTDQ: 8 words per register
// ============================================================================

#[cfg(target_arch = "x86_64")]
mod v4_vpopcntdq {
    use std::arch::x86_64::*;

    use crate::kernels::tail::lane_mask8;

    /// Loads the words selected by `mask`; other lanes are zero.
    #[target_feature(
        enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,avx512vpopcntdq,bmi1,bmi2,lzcnt,popcnt"
    )]
    #[inline]
    unsafe fn load(p: *const u64, mask: __mmask8) -> __m512i {
        _mm512_maskz_loadu_epi64(mask, p.cast())
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    #[inline]
    fn to_f32(count: i64) -> f32 {
        count as u64 as f32
    }

    macro_rules! pair {
        ($name:ident, $combine:ident) => {
            #[target_feature(
                enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,avx512vpopcntdq,bmi1,bmi2,lzcnt,popcnt"
            )]
            unsafe fn $name(a: &[u64], b: &[u64]) -> f32 {
                assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
                let n = a.len();
                let (pa, pb) = (a.as_ptr(), b.as_ptr());
                let mut acc = _mm512_setzero_si512();
                let mut i = 0;
                while i < n {
                    let mask = lane_mask8((n - i).min(8));
                    let x = $combine(load(pa.add(i), mask), load(pb.add(i), mask));
                    acc = _mm512_add_epi64(acc, _mm512_popcnt_epi64(x));
                    i += 8;
                }
                to_f32(_mm512_reduce_add_epi64(acc))
            }
        };
    }

    pair!(dot_kernel, _mm512_and_si512);
    pair!(sl2_kernel, _mm512_xor_si512);
    pair!(or_count_kernel, _mm512_or_si512);

    #[target_feature(
        enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,avx512vpopcntdq,bmi1,bmi2,lzcnt,popcnt"
    )]
    unsafe fn cnt_kernel(a: &[u64]) -> f32 {
        let n = a.len();
        let p = a.as_ptr();
        let mut acc = _mm512_setzero_si512();
        let mut i = 0;
        while i < n {
            let x = load(p.add(i), lane_mask8((n - i).min(8)));
            acc = _mm512_add_epi64(acc, _mm512_popcnt_epi64(x));
            i += 8;
        }
        to_f32(_mm512_reduce_add_epi64(acc))
    }

    #[target_feature(
        enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,avx512vpopcntdq,bmi1,bmi2,lzcnt,popcnt"
    )]
    unsafe fn cosine_kernel(a: &[u64], b: &[u64]) -> f32 {
        assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut xy = _mm512_setzero_si512();
        let mut xx = _mm512_setzero_si512();
        let mut yy = _mm512_setzero_si512();
        let mut i = 0;
        while i < n {
            let mask = lane_mask8((n - i).min(8));
            let x = load(pa.add(i), mask);
            let y = load(pb.add(i), mask);
            xy = _mm512_add_epi64(xy, _mm512_popcnt_epi64(_mm512_and_si512(x, y)));
            xx = _mm512_add_epi64(xx, _mm512_popcnt_epi64(x));
            yy = _mm512_add_epi64(yy, _mm512_popcnt_epi64(y));
            i += 8;
        }
        let xy = to_f32(_mm512_reduce_add_epi64(xy));
        let xx = to_f32(_mm512_reduce_add_epi64(xx));
        let yy = to_f32(_mm512_reduce_add_epi64(yy));
        xy / (xx * yy).sqrt()
    }

    #[target_feature(
        enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,avx512vpopcntdq,bmi1,bmi2,lzcnt,popcnt"
    )]
    unsafe fn jaccard_kernel(a: &[u64], b: &[u64]) -> f32 {
        assert_eq!(a.len(), b.len(), "bit vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut inter = _mm512_setzero_si512();
        let mut union = _mm512_setzero_si512();
        let mut i = 0;
        while i < n {
            let mask = lane_mask8((n - i).min(8));
            let x = load(pa.add(i), mask);
            let y = load(pb.add(i), mask);
            inter = _mm512_add_epi64(inter, _mm512_popcnt_epi64(_mm512_and_si512(x, y)));
            union = _mm512_add_epi64(union, _mm512_popcnt_epi64(_mm512_or_si512(x, y)));
            i += 8;
        }
        to_f32(_mm512_reduce_add_epi64(inter)) / to_f32(_mm512_reduce_add_epi64(union))
    }

    entries! {
        cnt => cnt_kernel(a: &[u64]) -> f32;
        dot => dot_kernel(a: &[u64], b: &[u64]) -> f32;
        sl2 => sl2_kernel(a: &[u64], b: &[u64]) -> f32;
        cosine => cosine_kernel(a: &[u64], b: &[u64]) -> f32;
        or_count => or_count_kernel(a: &[u64], b: &[u64]) -> f32;
        jaccard => jaccard_kernel(a: &[u64], b: &[u64]) -> f32;
    }
}

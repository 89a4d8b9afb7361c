//! Dense reduction kernels over f32 and f16 buffers.
//!
//! Vector tiers are written once, generic over [`Element`](super::Element): half-precision
//! lanes are widened to f32 at load time (F16C on x86-64, a stack conversion
//! on NEON) and accumulated exactly like single precision. The exceptions are
//! the 128-bit x86 tier, which has no half conversion and only serves f32,
//! and the AVX-512 FP16 tier, which accumulates in native half lanes.
//!
//! | Tier | Lanes | Unroll | Remainder |
//! |------|-------|--------|-----------|
//! | v2 (f32 only) | 4 | 2 | padded |
//! | neon | 4 | 2 | padded |
//! | v3 | 8 | 2 | masked (f32), padded (f16) |
//! | v4 | 16 | 1 | masked |
//! | v4_avx512fp16 (f16 only) | 32 | 1 | masked |

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use half::f16;

use super::{MinMaxKernel, PairKernel, UnaryKernel, scalar};
use crate::dispatch::{Capabilities, DenseTable};

/// Resolves the f32 kernels for `caps`.
pub(crate) fn table_f32(caps: Capabilities) -> DenseTable<f32> {
    DenseTable {
        sum: select!(caps, UnaryKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::sum_f32,
            #[cfg(target_arch = "x86_64")] V3 => v3::sum_f32,
            #[cfg(target_arch = "aarch64")] Neon => neon::sum_f32,
            #[cfg(target_arch = "x86_64")] V2 => v2::sum,
            _ => scalar::sum::<f32>,
        ),
        abs_sum: select!(caps, UnaryKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::abs_sum_f32,
            #[cfg(target_arch = "x86_64")] V3 => v3::abs_sum_f32,
            #[cfg(target_arch = "aarch64")] Neon => neon::abs_sum_f32,
            #[cfg(target_arch = "x86_64")] V2 => v2::abs_sum,
            _ => scalar::abs_sum::<f32>,
        ),
        sum_sq: select!(caps, UnaryKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::sum_sq_f32,
            #[cfg(target_arch = "x86_64")] V3 => v3::sum_sq_f32,
            #[cfg(target_arch = "aarch64")] Neon => neon::sum_sq_f32,
            #[cfg(target_arch = "x86_64")] V2 => v2::sum_sq,
            _ => scalar::sum_sq::<f32>,
        ),
        min_max: select!(caps, MinMaxKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::min_max_f32,
            #[cfg(target_arch = "x86_64")] V3 => v3::min_max_f32,
            #[cfg(target_arch = "aarch64")] Neon => neon::min_max_f32,
            #[cfg(target_arch = "x86_64")] V2 => v2::min_max,
            _ => scalar::min_max::<f32>,
        ),
        dot: select!(caps, PairKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::dot_f32,
            #[cfg(target_arch = "x86_64")] V3 => v3::dot_f32,
            #[cfg(target_arch = "aarch64")] Neon => neon::dot_f32,
            #[cfg(target_arch = "x86_64")] V2 => v2::dot,
            _ => scalar::dot::<f32>,
        ),
        cosine: select!(caps, PairKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::cosine_f32,
            #[cfg(target_arch = "x86_64")] V3 => v3::cosine_f32,
            #[cfg(target_arch = "aarch64")] Neon => neon::cosine_f32,
            #[cfg(target_arch = "x86_64")] V2 => v2::cosine,
            _ => scalar::cosine::<f32>,
        ),
        sl2: select!(caps, PairKernel<f32>;
            #[cfg(target_arch = "x86_64")] V4 => v4::sl2_f32,
            #[cfg(target_arch = "x86_64")] V3 => v3::sl2_f32,
            #[cfg(target_arch = "aarch64")] Neon => neon::sl2_f32,
            #[cfg(target_arch = "x86_64")] V2 => v2::sl2,
            _ => scalar::sl2::<f32>,
        ),
    }
}

/// Resolves the f16 kernels for `caps`.
pub(crate) fn table_f16(caps: Capabilities) -> DenseTable<f16> {
    DenseTable {
        sum: select!(caps, UnaryKernel<f16>;
            #[cfg(target_arch = "x86_64")] V4 => v4::sum_f16,
            #[cfg(target_arch = "x86_64")] V3 => v3::sum_f16,
            #[cfg(target_arch = "aarch64")] Neon => neon::sum_f16,
            _ => scalar::sum::<f16>,
        ),
        abs_sum: select!(caps, UnaryKernel<f16>;
            #[cfg(target_arch = "x86_64")] V4 => v4::abs_sum_f16,
            #[cfg(target_arch = "x86_64")] V3 => v3::abs_sum_f16,
            #[cfg(target_arch = "aarch64")] Neon => neon::abs_sum_f16,
            _ => scalar::abs_sum::<f16>,
        ),
        sum_sq: select!(caps, UnaryKernel<f16>;
            #[cfg(target_arch = "x86_64")] V4 => v4::sum_sq_f16,
            #[cfg(target_arch = "x86_64")] V3 => v3::sum_sq_f16,
            #[cfg(target_arch = "aarch64")] Neon => neon::sum_sq_f16,
            _ => scalar::sum_sq::<f16>,
        ),
        min_max: select!(caps, MinMaxKernel<f16>;
            #[cfg(target_arch = "x86_64")] V4 => v4::min_max_f16,
            #[cfg(target_arch = "x86_64")] V3 => v3::min_max_f16,
            #[cfg(target_arch = "aarch64")] Neon => neon::min_max_f16,
            _ => scalar::min_max::<f16>,
        ),
        dot: select!(caps, PairKernel<f16>;
            #[cfg(all(target_arch = "x86_64", feature = "nightly-fp16"))] V4Fp16 => v4fp16::dot,
            #[cfg(target_arch = "x86_64")] V4 => v4::dot_f16,
            #[cfg(target_arch = "x86_64")] V3 => v3::dot_f16,
            #[cfg(target_arch = "aarch64")] Neon => neon::dot_f16,
            _ => scalar::dot::<f16>,
        ),
        cosine: select!(caps, PairKernel<f16>;
            #[cfg(all(target_arch = "x86_64", feature = "nightly-fp16"))] V4Fp16 => v4fp16::cosine,
            #[cfg(target_arch = "x86_64")] V4 => v4::cosine_f16,
            #[cfg(target_arch = "x86_64")] V3 => v3::cosine_f16,
            #[cfg(target_arch = "aarch64")] Neon => neon::cosine_f16,
            _ => scalar::cosine::<f16>,
        ),
        sl2: select!(caps, PairKernel<f16>;
            #[cfg(all(target_arch = "x86_64", feature = "nightly-fp16"))] V4Fp16 => v4fp16::sl2,
            #[cfg(target_arch = "x86_64")] V4 => v4::sl2_f16,
            #[cfg(target_arch = "x86_64")] V3 => v3::sl2_f16,
            #[cfg(target_arch = "aarch64")] Neon => neon::sl2_f16,
            _ => scalar::sl2::<f16>,
        ),
    }
}

// ============================================================================
// x86-64-v2: SSE, 4 lanes, f32 only
// ============================================================================

#[cfg(target_arch = "x86_64")]
mod v2 {
    use std::arch::x86_64::*;

    use crate::kernels::emulate::{reduce_add_m128, reduce_max_m128, reduce_min_m128};
    use crate::kernels::tail::padded;

    /// Streams `a` through `$map` two chunks at a time and sums the lanes.
    macro_rules! unary {
        ($name:ident, |$x:ident| $map:expr) => {
            #[target_feature(enable = "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt")]
            unsafe fn $name(a: &[f32]) -> f32 {
                let n = a.len();
                let p = a.as_ptr();
                let mut acc0 = _mm_setzero_ps();
                let mut acc1 = _mm_setzero_ps();
                let mut i = 0;
                while i + 8 <= n {
                    let $x = _mm_loadu_ps(p.add(i));
                    acc0 = _mm_add_ps(acc0, $map);
                    let $x = _mm_loadu_ps(p.add(i + 4));
                    acc1 = _mm_add_ps(acc1, $map);
                    i += 8;
                }
                if i + 4 <= n {
                    let $x = _mm_loadu_ps(p.add(i));
                    acc0 = _mm_add_ps(acc0, $map);
                    i += 4;
                }
                if i < n {
                    let buf = padded::<f32, 4>(&a[i..], 0.0);
                    let $x = _mm_loadu_ps(buf.as_ptr());
                    acc1 = _mm_add_ps(acc1, $map);
                }
                reduce_add_m128(_mm_add_ps(acc0, acc1))
            }
        };
    }

    /// Same as `unary!` over two buffers of equal length.
    macro_rules! pair {
        ($name:ident, |$x:ident, $y:ident| $map:expr) => {
            #[target_feature(enable = "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt")]
            unsafe fn $name(a: &[f32], b: &[f32]) -> f32 {
                assert_eq!(a.len(), b.len(), "vectors must have equal length");
                let n = a.len();
                let (pa, pb) = (a.as_ptr(), b.as_ptr());
                let mut acc0 = _mm_setzero_ps();
                let mut acc1 = _mm_setzero_ps();
                let mut i = 0;
                while i + 8 <= n {
                    let ($x, $y) = (_mm_loadu_ps(pa.add(i)), _mm_loadu_ps(pb.add(i)));
                    acc0 = _mm_add_ps(acc0, $map);
                    let ($x, $y) = (_mm_loadu_ps(pa.add(i + 4)), _mm_loadu_ps(pb.add(i + 4)));
                    acc1 = _mm_add_ps(acc1, $map);
                    i += 8;
                }
                if i + 4 <= n {
                    let ($x, $y) = (_mm_loadu_ps(pa.add(i)), _mm_loadu_ps(pb.add(i)));
                    acc0 = _mm_add_ps(acc0, $map);
                    i += 4;
                }
                if i < n {
                    let ba = padded::<f32, 4>(&a[i..], 0.0);
                    let bb = padded::<f32, 4>(&b[i..], 0.0);
                    let ($x, $y) = (_mm_loadu_ps(ba.as_ptr()), _mm_loadu_ps(bb.as_ptr()));
                    acc1 = _mm_add_ps(acc1, $map);
                }
                reduce_add_m128(_mm_add_ps(acc0, acc1))
            }
        };
    }

    unary!(sum_kernel, |x| x);
    unary!(abs_sum_kernel, |x| _mm_andnot_ps(_mm_set1_ps(-0.0), x));
    unary!(sum_sq_kernel, |x| _mm_mul_ps(x, x));
    pair!(dot_kernel, |x, y| _mm_mul_ps(x, y));
    pair!(sl2_kernel, |x, y| {
        let d = _mm_sub_ps(x, y);
        _mm_mul_ps(d, d)
    });

    #[target_feature(enable = "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt")]
    unsafe fn min_max_kernel(a: &[f32]) -> (f32, f32) {
        let Some(&first) = a.first() else {
            return (0.0, 0.0);
        };
        let mut min = _mm_set1_ps(first);
        let mut max = min;
        let mut chunks = a.chunks_exact(4);
        for chunk in &mut chunks {
            let x = _mm_loadu_ps(chunk.as_ptr());
            min = _mm_min_ps(min, x);
            max = _mm_max_ps(max, x);
        }
        let rest = chunks.remainder();
        if let Some(&fill) = rest.first() {
            let buf = padded::<f32, 4>(rest, fill);
            let x = _mm_loadu_ps(buf.as_ptr());
            min = _mm_min_ps(min, x);
            max = _mm_max_ps(max, x);
        }
        (reduce_min_m128(min), reduce_max_m128(max))
    }

    #[target_feature(enable = "sse2,sse3,ssse3,sse4.1,sse4.2,popcnt")]
    unsafe fn cosine_kernel(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut xy = _mm_setzero_ps();
        let mut xx = _mm_setzero_ps();
        let mut yy = _mm_setzero_ps();
        let mut i = 0;
        while i + 4 <= n {
            let x = _mm_loadu_ps(pa.add(i));
            let y = _mm_loadu_ps(pb.add(i));
            xy = _mm_add_ps(xy, _mm_mul_ps(x, y));
            xx = _mm_add_ps(xx, _mm_mul_ps(x, x));
            yy = _mm_add_ps(yy, _mm_mul_ps(y, y));
            i += 4;
        }
        if i < n {
            let ba = padded::<f32, 4>(&a[i..], 0.0);
            let bb = padded::<f32, 4>(&b[i..], 0.0);
            let x = _mm_loadu_ps(ba.as_ptr());
            let y = _mm_loadu_ps(bb.as_ptr());
            xy = _mm_add_ps(xy, _mm_mul_ps(x, y));
            xx = _mm_add_ps(xx, _mm_mul_ps(x, x));
            yy = _mm_add_ps(yy, _mm_mul_ps(y, y));
        }
        let xy = reduce_add_m128(xy);
        let xx = reduce_add_m128(xx);
        let yy = reduce_add_m128(yy);
        xy / (xx * yy).sqrt()
    }

    entries! {
        sum => sum_kernel(a: &[f32]) -> f32;
        abs_sum => abs_sum_kernel(a: &[f32]) -> f32;
        sum_sq => sum_sq_kernel(a: &[f32]) -> f32;
        min_max => min_max_kernel(a: &[f32]) -> (f32, f32);
        dot => dot_kernel(a: &[f32], b: &[f32]) -> f32;
        cosine => cosine_kernel(a: &[f32], b: &[f32]) -> f32;
        sl2 => sl2_kernel(a: &[f32], b: &[f32]) -> f32;
    }
}

// ============================================================================
// x86-64-v3: AVX2 + FMA + F16C, 8 lanes
// ============================================================================

#[cfg(target_arch = "x86_64")]
mod v3 {
    use std::arch::x86_64::*;

    use half::f16;

    use crate::kernels::Element;
    use crate::kernels::emulate::{reduce_add_m256, reduce_max_m256, reduce_min_m256};
    use crate::kernels::tail::{lane_mask_m256, padded};

    /// Loads and widens eight elements.
    #[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
    #[inline]
    unsafe fn load<T: Element>(p: *const T) -> __m256 {
        if T::HALF {
            _mm256_cvtph_ps(_mm_loadu_si128(p.cast()))
        } else {
            _mm256_loadu_ps(p.cast())
        }
    }

    /// Loads fewer than eight elements; lanes past the end hold `fill`.
    #[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
    #[inline]
    unsafe fn load_tail<T: Element>(src: &[T], fill: T) -> __m256 {
        if T::HALF {
            let buf = padded::<T, 8>(src, fill);
            _mm256_cvtph_ps(_mm_loadu_si128(buf.as_ptr().cast()))
        } else {
            let mask = lane_mask_m256(src.len());
            let x = _mm256_maskload_ps(src.as_ptr().cast(), mask);
            _mm256_blendv_ps(_mm256_set1_ps(fill.widen()), x, _mm256_castsi256_ps(mask))
        }
    }

    macro_rules! unary {
        ($name:ident, |$x:ident, $acc:ident| $step:expr) => {
            #[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
            unsafe fn $name<T: Element>(a: &[T]) -> f32 {
                let n = a.len();
                let p = a.as_ptr();
                let mut acc0 = _mm256_setzero_ps();
                let mut acc1 = _mm256_setzero_ps();
                let mut i = 0;
                while i + 16 <= n {
                    let ($x, $acc) = (load(p.add(i)), acc0);
                    acc0 = $step;
                    let ($x, $acc) = (load(p.add(i + 8)), acc1);
                    acc1 = $step;
                    i += 16;
                }
                if i + 8 <= n {
                    let ($x, $acc) = (load(p.add(i)), acc0);
                    acc0 = $step;
                    i += 8;
                }
                if i < n {
                    let ($x, $acc) = (load_tail(&a[i..], T::default()), acc1);
                    acc1 = $step;
                }
                reduce_add_m256(_mm256_add_ps(acc0, acc1))
            }
        };
    }

    macro_rules! pair {
        ($name:ident, |$x:ident, $y:ident, $acc:ident| $step:expr) => {
            #[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
            unsafe fn $name<T: Element>(a: &[T], b: &[T]) -> f32 {
                assert_eq!(a.len(), b.len(), "vectors must have equal length");
                let n = a.len();
                let (pa, pb) = (a.as_ptr(), b.as_ptr());
                let mut acc0 = _mm256_setzero_ps();
                let mut acc1 = _mm256_setzero_ps();
                let mut i = 0;
                while i + 16 <= n {
                    let ($x, $y, $acc) = (load(pa.add(i)), load(pb.add(i)), acc0);
                    acc0 = $step;
                    let ($x, $y, $acc) = (load(pa.add(i + 8)), load(pb.add(i + 8)), acc1);
                    acc1 = $step;
                    i += 16;
                }
                if i + 8 <= n {
                    let ($x, $y, $acc) = (load(pa.add(i)), load(pb.add(i)), acc0);
                    acc0 = $step;
                    i += 8;
                }
                if i < n {
                    let $x = load_tail(&a[i..], T::default());
                    let $y = load_tail(&b[i..], T::default());
                    let $acc = acc1;
                    acc1 = $step;
                }
                reduce_add_m256(_mm256_add_ps(acc0, acc1))
            }
        };
    }

    unary!(sum, |x, acc| _mm256_add_ps(acc, x));
    unary!(abs_sum, |x, acc| _mm256_add_ps(acc, _mm256_andnot_ps(_mm256_set1_ps(-0.0), x)));
    unary!(sum_sq, |x, acc| _mm256_fmadd_ps(x, x, acc));
    pair!(dot, |x, y, acc| _mm256_fmadd_ps(x, y, acc));
    pair!(sl2, |x, y, acc| {
        let d = _mm256_sub_ps(x, y);
        _mm256_fmadd_ps(d, d, acc)
    });

    #[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
    unsafe fn min_max<T: Element>(a: &[T]) -> (f32, f32) {
        let Some(&first) = a.first() else {
            return (0.0, 0.0);
        };
        let n = a.len();
        let p = a.as_ptr();
        let mut min = _mm256_set1_ps(first.widen());
        let mut max = min;
        let mut i = 0;
        while i + 8 <= n {
            let x = load(p.add(i));
            min = _mm256_min_ps(min, x);
            max = _mm256_max_ps(max, x);
            i += 8;
        }
        if i < n {
            let x = load_tail(&a[i..], first);
            min = _mm256_min_ps(min, x);
            max = _mm256_max_ps(max, x);
        }
        (reduce_min_m256(min), reduce_max_m256(max))
    }

    #[target_feature(enable = "avx2,bmi1,bmi2,f16c,fma,lzcnt,popcnt")]
    unsafe fn cosine<T: Element>(a: &[T], b: &[T]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut xy = _mm256_setzero_ps();
        let mut xx = _mm256_setzero_ps();
        let mut yy = _mm256_setzero_ps();
        let mut i = 0;
        while i + 8 <= n {
            let x = load(pa.add(i));
            let y = load(pb.add(i));
            xy = _mm256_fmadd_ps(x, y, xy);
            xx = _mm256_fmadd_ps(x, x, xx);
            yy = _mm256_fmadd_ps(y, y, yy);
            i += 8;
        }
        if i < n {
            let x = load_tail(&a[i..], T::default());
            let y = load_tail(&b[i..], T::default());
            xy = _mm256_fmadd_ps(x, y, xy);
            xx = _mm256_fmadd_ps(x, x, xx);
            yy = _mm256_fmadd_ps(y, y, yy);
        }
        let xy = reduce_add_m256(xy);
        let xx = reduce_add_m256(xx);
        let yy = reduce_add_m256(yy);
        xy / (xx * yy).sqrt()
    }

    entries! {
        sum_f32 => sum::<f32>(a: &[f32]) -> f32;
        abs_sum_f32 => abs_sum::<f32>(a: &[f32]) -> f32;
        sum_sq_f32 => sum_sq::<f32>(a: &[f32]) -> f32;
        min_max_f32 => min_max::<f32>(a: &[f32]) -> (f32, f32);
        dot_f32 => dot::<f32>(a: &[f32], b: &[f32]) -> f32;
        cosine_f32 => cosine::<f32>(a: &[f32], b: &[f32]) -> f32;
        sl2_f32 => sl2::<f32>(a: &[f32], b: &[f32]) -> f32;
        sum_f16 => sum::<f16>(a: &[f16]) -> f32;
        abs_sum_f16 => abs_sum::<f16>(a: &[f16]) -> f32;
        sum_sq_f16 => sum_sq::<f16>(a: &[f16]) -> f32;
        min_max_f16 => min_max::<f16>(a: &[f16]) -> (f32, f32);
        dot_f16 => dot::<f16>(a: &[f16], b: &[f16]) -> f32;
        cosine_f16 => cosine::<f16>(a: &[f16], b: &[f16]) -> f32;
        sl2_f16 => sl2::<f16>(a: &[f16], b: &[f16]) -> f32;
    }
}

// ============================================================================
// x86-64-v4: AVX-512, 16 lanes
// ============================================================================

#[cfg(target_arch = "x86_64")]
mod v4 {
    use std::arch::x86_64::*;

    use half::f16;

    use crate::kernels::Element;
    use crate::kernels::tail::lane_mask16;

    const FULL: __mmask16 = 0xffff;

    /// Loads the lanes of `mask` from `p` and widens them; other lanes are zero.
    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    #[inline]
    unsafe fn load<T: Element>(p: *const T, mask: __mmask16) -> __m512 {
        if T::HALF {
            _mm512_cvtph_ps(_mm256_maskz_loadu_epi16(mask, p.cast()))
        } else {
            _mm512_maskz_loadu_ps(mask, p.cast())
        }
    }

    macro_rules! unary {
        ($name:ident, |$x:ident, $acc:ident| $step:expr) => {
            #[target_feature(
                enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt"
            )]
            unsafe fn $name<T: Element>(a: &[T]) -> f32 {
                let n = a.len();
                let p = a.as_ptr();
                let mut acc0 = _mm512_setzero_ps();
                let mut acc1 = _mm512_setzero_ps();
                let mut i = 0;
                while i + 32 <= n {
                    let ($x, $acc) = (load(p.add(i), FULL), acc0);
                    acc0 = $step;
                    let ($x, $acc) = (load(p.add(i + 16), FULL), acc1);
                    acc1 = $step;
                    i += 32;
                }
                while i < n {
                    let ($x, $acc) = (load(p.add(i), lane_mask16((n - i).min(16))), acc0);
                    acc0 = $step;
                    i += 16;
                }
                _mm512_reduce_add_ps(_mm512_add_ps(acc0, acc1))
            }
        };
    }

    macro_rules! pair {
        ($name:ident, |$x:ident, $y:ident, $acc:ident| $step:expr) => {
            #[target_feature(
                enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt"
            )]
            unsafe fn $name<T: Element>(a: &[T], b: &[T]) -> f32 {
                assert_eq!(a.len(), b.len(), "vectors must have equal length");
                let n = a.len();
                let (pa, pb) = (a.as_ptr(), b.as_ptr());
                let mut acc0 = _mm512_setzero_ps();
                let mut acc1 = _mm512_setzero_ps();
                let mut i = 0;
                while i + 32 <= n {
                    let ($x, $y, $acc) = (load(pa.add(i), FULL), load(pb.add(i), FULL), acc0);
                    acc0 = $step;
                    let ($x, $y, $acc) =
                        (load(pa.add(i + 16), FULL), load(pb.add(i + 16), FULL), acc1);
                    acc1 = $step;
                    i += 32;
                }
                while i < n {
                    let mask = lane_mask16((n - i).min(16));
                    let ($x, $y, $acc) = (load(pa.add(i), mask), load(pb.add(i), mask), acc0);
                    acc0 = $step;
                    i += 16;
                }
                _mm512_reduce_add_ps(_mm512_add_ps(acc0, acc1))
            }
        };
    }

    unary!(sum, |x, acc| _mm512_add_ps(acc, x));
    unary!(abs_sum, |x, acc| _mm512_add_ps(acc, _mm512_abs_ps(x)));
    unary!(sum_sq, |x, acc| _mm512_fmadd_ps(x, x, acc));
    pair!(dot, |x, y, acc| _mm512_fmadd_ps(x, y, acc));
    pair!(sl2, |x, y, acc| {
        let d = _mm512_sub_ps(x, y);
        _mm512_fmadd_ps(d, d, acc)
    });

    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn min_max<T: Element>(a: &[T]) -> (f32, f32) {
        if a.is_empty() {
            return (0.0, 0.0);
        }
        let n = a.len();
        let p = a.as_ptr();
        let mut min = _mm512_set1_ps(f32::INFINITY);
        let mut max = _mm512_set1_ps(f32::NEG_INFINITY);
        let mut i = 0;
        while i < n {
            let mask = lane_mask16((n - i).min(16));
            let x = load(p.add(i), mask);
            min = _mm512_mask_min_ps(min, mask, min, x);
            max = _mm512_mask_max_ps(max, mask, max, x);
            i += 16;
        }
        (_mm512_reduce_min_ps(min), _mm512_reduce_max_ps(max))
    }

    #[target_feature(enable = "avx512f,avx512bw,avx512cd,avx512dq,avx512vl,bmi1,bmi2,lzcnt,popcnt")]
    unsafe fn cosine<T: Element>(a: &[T], b: &[T]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let zero = _mm512_setzero_ps();
        let (mut xy0, mut xx0, mut yy0) = (zero, zero, zero);
        let (mut xy1, mut xx1, mut yy1) = (zero, zero, zero);
        let mut i = 0;
        while i + 32 <= n {
            let (x, y) = (load(pa.add(i), FULL), load(pb.add(i), FULL));
            xy0 = _mm512_fmadd_ps(x, y, xy0);
            xx0 = _mm512_fmadd_ps(x, x, xx0);
            yy0 = _mm512_fmadd_ps(y, y, yy0);
            let (x, y) = (load(pa.add(i + 16), FULL), load(pb.add(i + 16), FULL));
            xy1 = _mm512_fmadd_ps(x, y, xy1);
            xx1 = _mm512_fmadd_ps(x, x, xx1);
            yy1 = _mm512_fmadd_ps(y, y, yy1);
            i += 32;
        }
        while i < n {
            let mask = lane_mask16((n - i).min(16));
            let (x, y) = (load(pa.add(i), mask), load(pb.add(i), mask));
            xy0 = _mm512_fmadd_ps(x, y, xy0);
            xx0 = _mm512_fmadd_ps(x, x, xx0);
            yy0 = _mm512_fmadd_ps(y, y, yy0);
            i += 16;
        }
        let xy = _mm512_reduce_add_ps(_mm512_add_ps(xy0, xy1));
        let xx = _mm512_reduce_add_ps(_mm512_add_ps(xx0, xx1));
        let yy = _mm512_reduce_add_ps(_mm512_add_ps(yy0, yy1));
        xy / (xx * yy).sqrt()
    }

    entries! {
        sum_f32 => sum::<f32>(a: &[f32]) -> f32;
        abs_sum_f32 => abs_sum::<f32>(a: &[f32]) -> f32;
        sum_sq_f32 => sum_sq::<f32>(a: &[f32]) -> f32;
        min_max_f32 => min_max::<f32>(a: &[f32]) -> (f32, f32);
        dot_f32 => dot::<f32>(a: &[f32], b: &[f32]) -> f32;
        cosine_f32 => cosine::<f32>(a: &[f32], b: &[f32]) -> f32;
        sl2_f32 => sl2::<f32>(a: &[f32], b: &[f32]) -> f32;
        sum_f16 => sum::<f16>(a: &[f16]) -> f32;
        abs_sum_f16 => abs_sum::<f16>(a: &[f16]) -> f32;
        sum_sq_f16 => sum_sq::<f16>(a: &[f16]) -> f32;
        min_max_f16 => min_max::<f16>(a: &[f16]) -> (f32, f32);
        dot_f16 => dot::<f16>(a: &[f16], b: &[f16]) -> f32;
        cosine_f16 => cosine::<f16>(a: &[f16], b: &[f16]) -> f32;
        sl2_f16 => sl2::<f16>(a: &[f16], b: &[f16]) -> f32;
    }
}

// ============================================================================
// x86-64-v4 + AVX512FP16: 32 native half lanes
// ============================================================================

#[cfg(all(target_arch = "x86_64", feature = "nightly-fp16"))]
mod v4fp16 {
    use std::arch::x86_64::*;

    use half::f16;

    use crate::kernels::tail::lane_mask32;

    #[target_feature(enable = "avx512fp16,avx512f,avx512bw,avx512vl")]
    #[inline]
    unsafe fn load(p: *const f16, mask: __mmask32) -> __m512h {
        _mm512_castsi512_ph(_mm512_maskz_loadu_epi16(mask, p.cast()))
    }

    /// Widens each half lane and sums in f32.
    #[target_feature(enable = "avx512fp16,avx512f,avx512bw,avx512vl")]
    #[inline]
    unsafe fn reduce_add(v: __m512h) -> f32 {
        let lanes: [u16; 32] = std::mem::transmute(v);
        lanes.iter().map(|&bits| f16::from_bits(bits).to_f32()).sum()
    }

    #[target_feature(enable = "avx512fp16,avx512f,avx512bw,avx512vl")]
    unsafe fn dot_kernel(a: &[f16], b: &[f16]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut xy = _mm512_setzero_ph();
        let mut i = 0;
        while i < n {
            let mask = lane_mask32((n - i).min(32));
            xy = _mm512_fmadd_ph(load(pa.add(i), mask), load(pb.add(i), mask), xy);
            i += 32;
        }
        reduce_add(xy)
    }

    #[target_feature(enable = "avx512fp16,avx512f,avx512bw,avx512vl")]
    unsafe fn cosine_kernel(a: &[f16], b: &[f16]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut xy = _mm512_setzero_ph();
        let mut xx = _mm512_setzero_ph();
        let mut yy = _mm512_setzero_ph();
        let mut i = 0;
        while i < n {
            let mask = lane_mask32((n - i).min(32));
            let x = load(pa.add(i), mask);
            let y = load(pb.add(i), mask);
            xy = _mm512_fmadd_ph(x, y, xy);
            xx = _mm512_fmadd_ph(x, x, xx);
            yy = _mm512_fmadd_ph(y, y, yy);
            i += 32;
        }
        let xy = reduce_add(xy);
        let xx = reduce_add(xx);
        let yy = reduce_add(yy);
        xy / (xx * yy).sqrt()
    }

    #[target_feature(enable = "avx512fp16,avx512f,avx512bw,avx512vl")]
    unsafe fn sl2_kernel(a: &[f16], b: &[f16]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must have equal length");
        let n = a.len();
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut d2 = _mm512_setzero_ph();
        let mut i = 0;
        while i < n {
            let mask = lane_mask32((n - i).min(32));
            let d = _mm512_sub_ph(load(pa.add(i), mask), load(pb.add(i), mask));
            d2 = _mm512_fmadd_ph(d, d, d2);
            i += 32;
        }
        reduce_add(d2)
    }

    entries! {
        dot => dot_kernel(a: &[f16], b: &[f16]) -> f32;
        cosine => cosine_kernel(a: &[f16], b: &[f16]) -> f32;
        sl2 => sl2_kernel(a: &[f16], b: &[f16]) -> f32;
    }
}

// ============================================================================
// aarch64 NEON, 4 lanes
// ============================================================================

#[cfg(target_arch = "aarch64")]
mod neon {
    use std::arch::aarch64::*;

    use half::f16;

    use crate::kernels::Element;
    use crate::kernels::tail::padded;

    /// Loads and widens exactly four elements.
    #[target_feature(enable = "neon")]
    #[inline]
    unsafe fn load<T: Element>(src: &[T]) -> float32x4_t {
        debug_assert_eq!(src.len(), 4);
        if T::HALF {
            let mut buf = [0.0f32; 4];
            T::widen_slice(src, &mut buf);
            vld1q_f32(buf.as_ptr())
        } else {
            vld1q_f32(src.as_ptr().cast())
        }
    }

    macro_rules! unary {
        ($name:ident, |$x:ident, $acc:ident| $step:expr) => {
            #[target_feature(enable = "neon")]
            unsafe fn $name<T: Element>(a: &[T]) -> f32 {
                let mut acc0 = vdupq_n_f32(0.0);
                let mut acc1 = vdupq_n_f32(0.0);
                let mut chunks = a.chunks_exact(8);
                for chunk in &mut chunks {
                    let ($x, $acc) = (load(&chunk[..4]), acc0);
                    acc0 = $step;
                    let ($x, $acc) = (load(&chunk[4..]), acc1);
                    acc1 = $step;
                }
                let mut rest = chunks.remainder();
                if rest.len() >= 4 {
                    let ($x, $acc) = (load(&rest[..4]), acc0);
                    acc0 = $step;
                    rest = &rest[4..];
                }
                if !rest.is_empty() {
                    let buf = padded::<T, 4>(rest, T::default());
                    let ($x, $acc) = (load(&buf), acc1);
                    acc1 = $step;
                }
                vaddvq_f32(vaddq_f32(acc0, acc1))
            }
        };
    }

    macro_rules! pair {
        ($name:ident, |$x:ident, $y:ident, $acc:ident| $step:expr) => {
            #[target_feature(enable = "neon")]
            unsafe fn $name<T: Element>(a: &[T], b: &[T]) -> f32 {
                assert_eq!(a.len(), b.len(), "vectors must have equal length");
                let mut acc0 = vdupq_n_f32(0.0);
                let mut acc1 = vdupq_n_f32(0.0);
                let mut ca = a.chunks_exact(8);
                let mut cb = b.chunks_exact(8);
                for (u, v) in (&mut ca).zip(&mut cb) {
                    let ($x, $y, $acc) = (load(&u[..4]), load(&v[..4]), acc0);
                    acc0 = $step;
                    let ($x, $y, $acc) = (load(&u[4..]), load(&v[4..]), acc1);
                    acc1 = $step;
                }
                let (mut ra, mut rb) = (ca.remainder(), cb.remainder());
                if ra.len() >= 4 {
                    let ($x, $y, $acc) = (load(&ra[..4]), load(&rb[..4]), acc0);
                    acc0 = $step;
                    ra = &ra[4..];
                    rb = &rb[4..];
                }
                if !ra.is_empty() {
                    let ba = padded::<T, 4>(ra, T::default());
                    let bb = padded::<T, 4>(rb, T::default());
                    let ($x, $y, $acc) = (load(&ba), load(&bb), acc1);
                    acc1 = $step;
                }
                vaddvq_f32(vaddq_f32(acc0, acc1))
            }
        };
    }

    unary!(sum, |x, acc| vaddq_f32(acc, x));
    unary!(abs_sum, |x, acc| vaddq_f32(acc, vabsq_f32(x)));
    unary!(sum_sq, |x, acc| vfmaq_f32(acc, x, x));
    pair!(dot, |x, y, acc| vfmaq_f32(acc, x, y));
    pair!(sl2, |x, y, acc| {
        let d = vsubq_f32(x, y);
        vfmaq_f32(acc, d, d)
    });

    #[target_feature(enable = "neon")]
    unsafe fn min_max<T: Element>(a: &[T]) -> (f32, f32) {
        let Some(&first) = a.first() else {
            return (0.0, 0.0);
        };
        let mut min = vdupq_n_f32(first.widen());
        let mut max = min;
        let mut chunks = a.chunks_exact(4);
        for chunk in &mut chunks {
            let x = load(chunk);
            min = vminq_f32(min, x);
            max = vmaxq_f32(max, x);
        }
        let rest = chunks.remainder();
        if !rest.is_empty() {
            let buf = padded::<T, 4>(rest, first);
            let x = load(&buf);
            min = vminq_f32(min, x);
            max = vmaxq_f32(max, x);
        }
        (vminvq_f32(min), vmaxvq_f32(max))
    }

    #[target_feature(enable = "neon")]
    unsafe fn cosine<T: Element>(a: &[T], b: &[T]) -> f32 {
        assert_eq!(a.len(), b.len(), "vectors must have equal length");
        let mut xy = vdupq_n_f32(0.0);
        let mut xx = vdupq_n_f32(0.0);
        let mut yy = vdupq_n_f32(0.0);
        let mut ca = a.chunks_exact(4);
        let mut cb = b.chunks_exact(4);
        for (u, v) in (&mut ca).zip(&mut cb) {
            let (x, y) = (load(u), load(v));
            xy = vfmaq_f32(xy, x, y);
            xx = vfmaq_f32(xx, x, x);
            yy = vfmaq_f32(yy, y, y);
        }
        let (ra, rb) = (ca.remainder(), cb.remainder());
        if !ra.is_empty() {
            let x = load(&padded::<T, 4>(ra, T::default()));
            let y = load(&padded::<T, 4>(rb, T::default()));
            xy = vfmaq_f32(xy, x, y);
            xx = vfmaq_f32(xx, x, x);
            yy = vfmaq_f32(yy, y, y);
        }
        let xy = vaddvq_f32(xy);
        let xx = vaddvq_f32(xx);
        let yy = vaddvq_f32(yy);
        xy / (xx * yy).sqrt()
    }

    entries! {
        sum_f32 => sum::<f32>(a: &[f32]) -> f32;
        abs_sum_f32 => abs_sum::<f32>(a: &[f32]) -> f32;
        sum_sq_f32 => sum_sq::<f32>(a: &[f32]) -> f32;
        min_max_f32 => min_max::<f32>(a: &[f32]) -> (f32, f32);
        dot_f32 => dot::<f32>(a: &[f32], b: &[f32]) -> f32;
        cosine_f32 => cosine::<f32>(a: &[f32], b: &[f32]) -> f32;
        sl2_f32 => sl2::<f32>(a: &[f32], b: &[f32]) -> f32;
        sum_f16 => sum::<f16>(a: &[f16]) -> f32;
        abs_sum_f16 => abs_sum::<f16>(a: &[f16]) -> f32;
        sum_sq_f16 => sum_sq::<f16>(a: &[f16]) -> f32;
        min_max_f16 => min_max::<f16>(a: &[f16]) -> (f32, f32);
        dot_f16 => dot::<f16>(a: &[f16], b: &[f16]) -> f32;
        cosine_f16 => cosine::<f16>(a: &[f16], b: &[f16]) -> f32;
        sl2_f16 => sl2::<f16>(a: &[f16], b: &[f16]) -> f32;
    }
}

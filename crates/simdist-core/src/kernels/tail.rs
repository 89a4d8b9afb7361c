//! Remainder handling for the final partial chunk.
//!
//! After the last full-width chunk, `0 <= r < width` elements remain. Kernels
//! finish them one of two ways:
//!
//! - **Padding**: copy the `r` elements into a zero-initialised stack array of
//!   exactly one chunk and run one more full-width pass. Zero contributes
//!   nothing to any sum, product, or squared difference. Min/max pads with an
//!   element already in the input instead, so padding never wins.
//! - **Masking**: load only the first `r` lanes with a mask and treat the
//!   rest as zero (AVX-512 `maskz` loads, AVX `maskload`).
//!
//! Both are exactly equivalent to running the scalar loop over the tail.

#![allow(unsafe_code)]

/// Copies `src` into a `W`-wide stack buffer, filling unused lanes with `fill`.
#[inline(always)]
pub(crate) fn padded<T: Copy, const W: usize>(src: &[T], fill: T) -> [T; W] {
    debug_assert!(src.len() <= W, "tail of {} exceeds chunk {W}", src.len());
    let mut buf = [fill; W];
    buf[..src.len()].copy_from_slice(src);
    buf
}

/// Mask selecting the low `rem` of 8 lanes.
#[inline(always)]
pub(crate) const fn lane_mask8(rem: usize) -> u8 {
    debug_assert!(rem <= 8);
    ((1u32 << rem) - 1) as u8
}

/// Mask selecting the low `rem` of 16 lanes.
#[inline(always)]
pub(crate) const fn lane_mask16(rem: usize) -> u16 {
    debug_assert!(rem <= 16);
    ((1u32 << rem) - 1) as u16
}

/// Mask selecting the low `rem` of 32 lanes.
#[inline(always)]
#[cfg_attr(not(feature = "nightly-fp16"), allow(dead_code))]
pub(crate) const fn lane_mask32(rem: usize) -> u32 {
    debug_assert!(rem <= 32);
    if rem == 32 {
        u32::MAX
    } else {
        (1u32 << rem) - 1
    }
}

/// AVX lane mask whose low `rem` 32-bit lanes are all ones.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
pub(crate) unsafe fn lane_mask_m256(rem: usize) -> std::arch::x86_64::__m256i {
    use std::arch::x86_64::*;
    debug_assert!(rem <= 8);
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let rem = _mm256_set1_epi32(rem as i32);
    _mm256_cmpgt_epi32(rem, _mm256_setr_epi32(0, 1, 2, 3, 4, 5, 6, 7))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_zero_fill() {
        let buf: [f32; 8] = padded(&[1.0, 2.0, 3.0], 0.0);
        assert_eq!(buf, [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_padded_empty_and_full() {
        let empty: [f32; 4] = padded(&[], 7.0);
        assert_eq!(empty, [7.0; 4]);
        let full: [u64; 2] = padded(&[1, 2], 0);
        assert_eq!(full, [1, 2]);
    }

    #[test]
    fn test_lane_masks() {
        assert_eq!(lane_mask8(0), 0);
        assert_eq!(lane_mask8(3), 0b111);
        assert_eq!(lane_mask8(8), 0xff);
        assert_eq!(lane_mask16(0), 0);
        assert_eq!(lane_mask16(5), 0b1_1111);
        assert_eq!(lane_mask16(16), 0xffff);
        assert_eq!(lane_mask32(31), 0x7fff_ffff);
        assert_eq!(lane_mask32(32), u32::MAX);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_lane_mask_m256() {
        use crate::dispatch::{Tier, detect};
        if !detect().contains(Tier::V3) {
            println!("test {} ... skipped (v3)", module_path!());
            return;
        }
        for rem in 0..=8 {
            // SAFETY: v3 support was checked above.
            let mask = unsafe { lane_mask_m256(rem) };
            // SAFETY: __m256i and [i32; 8] have the same size.
            let lanes: [i32; 8] = unsafe { std::mem::transmute(mask) };
            for (lane, &v) in lanes.iter().enumerate() {
                assert_eq!(v, if lane < rem { -1 } else { 0 }, "rem {rem} lane {lane}");
            }
        }
    }
}

//! Dense f32 and f16 entry points.

use simdist_core::{checked, vecf16, vecf32};

use crate::error::{SimdistStatus, set_error};
use crate::types::{halves, require, slice};

// =========================================================================
// Unchecked
// =========================================================================

macro_rules! unary {
    ($($(#[$meta:meta])* $name:ident($elem:ty) => $load:ident, $func:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// # Safety
            ///
            /// `a` must be valid for `n` reads.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(a: *const $elem, n: usize) -> f32 {
                // SAFETY: Caller guarantees a is valid for n elements.
                let a = unsafe { $load(a, n) };
                $func(a)
            }
        )*
    };
}

macro_rules! pair {
    ($($(#[$meta:meta])* $name:ident($elem:ty) => $load:ident, $func:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// # Safety
            ///
            /// `a` and `b` must each be valid for `n` reads.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(a: *const $elem, b: *const $elem, n: usize) -> f32 {
                // SAFETY: Caller guarantees both pointers are valid for n elements.
                let (a, b) = unsafe { ($load(a, n), $load(b, n)) };
                $func(a, b)
            }
        )*
    };
}

unary! {
    /// Sum of `n` f32 values.
    simdist_f32_sum(f32) => slice, vecf32::sum;
    /// Sum of absolute f32 values.
    simdist_f32_abs_sum(f32) => slice, vecf32::abs_sum;
    /// Sum of squared f32 values.
    simdist_f32_sum_sq(f32) => slice, vecf32::sum_sq;
    /// Sum of `n` f16 values.
    simdist_f16_sum(u16) => halves, vecf16::sum;
    /// Sum of absolute f16 values.
    simdist_f16_abs_sum(u16) => halves, vecf16::abs_sum;
    /// Sum of squared f16 values.
    simdist_f16_sum_sq(u16) => halves, vecf16::sum_sq;
}

pair! {
    /// f32 inner product.
    simdist_f32_dot(f32) => slice, vecf32::dot;
    /// f32 cosine similarity.
    simdist_f32_cosine(f32) => slice, vecf32::cosine;
    /// f32 squared Euclidean distance.
    simdist_f32_sl2(f32) => slice, vecf32::sl2;
    /// f16 inner product.
    simdist_f16_dot(u16) => halves, vecf16::dot;
    /// f16 cosine similarity.
    simdist_f16_cosine(u16) => halves, vecf16::cosine;
    /// f16 squared Euclidean distance.
    simdist_f16_sl2(u16) => halves, vecf16::sl2;
}

/// Smallest and largest of `n` f32 values, written to `min` and `max`.
///
/// # Safety
///
/// `a` must be valid for `n` reads; `min` and `max` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn simdist_f32_min_max(a: *const f32, n: usize, min: *mut f32, max: *mut f32) {
    // SAFETY: Caller guarantees a is valid for n elements.
    let (lo, hi) = vecf32::min_max(unsafe { slice(a, n) });
    // SAFETY: Caller guarantees both outputs are writable.
    unsafe {
        *min = lo;
        *max = hi;
    }
}

/// Smallest and largest of `n` f16 values, widened to f32.
///
/// # Safety
///
/// `a` must be valid for `n` reads; `min` and `max` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn simdist_f16_min_max(a: *const u16, n: usize, min: *mut f32, max: *mut f32) {
    // SAFETY: Caller guarantees a is valid for n elements.
    let (lo, hi) = vecf16::min_max(unsafe { halves(a, n) });
    // SAFETY: Caller guarantees both outputs are writable.
    unsafe {
        *min = lo;
        *max = hi;
    }
}

// =========================================================================
// Checked
// =========================================================================

macro_rules! checked_pair {
    ($($(#[$meta:meta])* $name:ident($elem:ty) => $load:ident, $func:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// Returns `ErrorLengthMismatch` if `na != nb`, leaving `out` untouched.
            ///
            /// # Safety
            ///
            /// `a` must be valid for `na` reads, `b` for `nb` reads, and `out`
            /// for one write. Null pointers are reported, not dereferenced.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(
                a: *const $elem,
                na: usize,
                b: *const $elem,
                nb: usize,
                out: *mut f32,
            ) -> SimdistStatus {
                require!(a, na; b, nb => out);
                // SAFETY: Pointers are non-null and caller guarantees their extents.
                let (a, b) = unsafe { ($load(a, na), $load(b, nb)) };
                match $func(a, b) {
                    Ok(value) => {
                        // SAFETY: out is non-null and writable.
                        unsafe { *out = value };
                        SimdistStatus::Ok
                    }
                    Err(e) => set_error(&e),
                }
            }
        )*
    };
}

checked_pair! {
    /// Checked f32 inner product.
    simdist_checked_f32_dot(f32) => slice, checked::f32_dot;
    /// Checked f32 cosine similarity.
    simdist_checked_f32_cosine(f32) => slice, checked::f32_cosine;
    /// Checked f32 squared Euclidean distance.
    simdist_checked_f32_sl2(f32) => slice, checked::f32_sl2;
    /// Checked f16 inner product.
    simdist_checked_f16_dot(u16) => halves, checked::f16_dot;
    /// Checked f16 cosine similarity.
    simdist_checked_f16_cosine(u16) => halves, checked::f16_cosine;
    /// Checked f16 squared Euclidean distance.
    simdist_checked_f16_sl2(u16) => halves, checked::f16_sl2;
}

#[cfg(test)]
mod tests {
    use half::f16;

    use super::*;

    const A: [f32; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const B: [f32; 5] = [5.0, 4.0, 3.0, 2.0, 1.0];

    #[test]
    fn test_unchecked_f32() {
        // SAFETY: Both arrays hold five elements.
        unsafe {
            assert!((simdist_f32_dot(A.as_ptr(), B.as_ptr(), 5) - 35.0).abs() < 1e-5);
            assert!((simdist_f32_sl2(A.as_ptr(), B.as_ptr(), 5) - 40.0).abs() < 1e-5);
            assert!((simdist_f32_sum(A.as_ptr(), 5) - 15.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_min_max_outputs() {
        let (mut lo, mut hi) = (0.0, 0.0);
        // SAFETY: A holds five elements and both outputs are locals.
        unsafe { simdist_f32_min_max(A.as_ptr(), 5, &raw mut lo, &raw mut hi) };
        assert_eq!((lo, hi), (1.0, 5.0));

        let h: Vec<u16> = [-3.0f32, 0.5].iter().map(|&v| f16::from_f32(v).to_bits()).collect();
        // SAFETY: h holds two elements and both outputs are locals.
        unsafe { simdist_f16_min_max(h.as_ptr(), 2, &raw mut lo, &raw mut hi) };
        assert_eq!((lo, hi), (-3.0, 0.5));
    }

    #[test]
    fn test_checked_length_mismatch() {
        let mut out = -1.0;
        // SAFETY: Extents match the arrays; out is a local.
        let status = unsafe { simdist_checked_f32_dot(A.as_ptr(), 5, B.as_ptr(), 4, &raw mut out) };
        assert_eq!(status, SimdistStatus::ErrorLengthMismatch);
        assert_eq!(out, -1.0);

        // SAFETY: Same as above.
        let status = unsafe { simdist_checked_f32_dot(A.as_ptr(), 5, B.as_ptr(), 5, &raw mut out) };
        assert_eq!(status, SimdistStatus::Ok);
        assert!((out - 35.0).abs() < 1e-5);
    }

    #[test]
    fn test_checked_null_pointer() {
        let mut out = 0.0;
        // SAFETY: The null input is reported before any read.
        let status =
            unsafe { simdist_checked_f16_sl2(std::ptr::null(), 3, std::ptr::null(), 3, &raw mut out) };
        assert_eq!(status, SimdistStatus::ErrorNullPointer);

        // SAFETY: Empty inputs may be null.
        let status =
            unsafe { simdist_checked_f16_sl2(std::ptr::null(), 0, std::ptr::null(), 0, &raw mut out) };
        assert_eq!(status, SimdistStatus::Ok);
        assert_eq!(out, 0.0);
    }
}

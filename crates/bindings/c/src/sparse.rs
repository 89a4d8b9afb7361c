//! Sparse entry points.
//!
//! Each side is an index array and a value array of the same length.

use simdist_core::{checked, sparse, vecf16};

use crate::error::{SimdistStatus, set_error};
use crate::types::{halves, require, slice};

macro_rules! unchecked {
    ($($(#[$meta:meta])* $name:ident($elem:ty) => $load:ident, $func:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// # Safety
            ///
            /// `lidx` and `lval` must be valid for `ln` reads, `ridx` and `rval`
            /// for `rn` reads, and both index arrays strictly increasing.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(
                lidx: *const u32,
                lval: *const $elem,
                ln: usize,
                ridx: *const u32,
                rval: *const $elem,
                rn: usize,
            ) -> f32 {
                // SAFETY: Caller guarantees every pointer is valid for its side's length.
                let (li, lv, ri, rv) =
                    unsafe { (slice(lidx, ln), $load(lval, ln), slice(ridx, rn), $load(rval, rn)) };
                $func(li, lv, ri, rv)
            }
        )*
    };
}

unchecked! {
    /// Sparse inner product with f32 values.
    simdist_sparse_dot(f32) => slice, sparse::dot;
    /// Sparse cosine similarity with f32 values.
    simdist_sparse_cosine(f32) => slice, sparse::cosine;
    /// Sparse squared distance with f32 values.
    simdist_sparse_sl2(f32) => slice, sparse::sl2;
    /// Sparse inner product with f16 values.
    simdist_sparse_f16_dot(u16) => halves, vecf16::sparse_dot;
    /// Sparse cosine similarity with f16 values.
    simdist_sparse_f16_cosine(u16) => halves, vecf16::sparse_cosine;
    /// Sparse squared distance with f16 values.
    simdist_sparse_f16_sl2(u16) => halves, vecf16::sparse_sl2;
}

macro_rules! checked {
    ($($(#[$meta:meta])* $name:ident => $func:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// Returns `ErrorUnsortedIndices` if either index array is not
            /// strictly increasing.
            ///
            /// # Safety
            ///
            /// `lidx` and `lval` must be valid for `ln` reads, `ridx` and `rval`
            /// for `rn` reads, and `out` for one write. Null pointers are
            /// reported, not dereferenced.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(
                lidx: *const u32,
                lval: *const f32,
                ln: usize,
                ridx: *const u32,
                rval: *const f32,
                rn: usize,
                out: *mut f32,
            ) -> SimdistStatus {
                require!(lidx, ln; lval, ln; ridx, rn; rval, rn => out);
                // SAFETY: Pointers are non-null and caller guarantees their extents.
                let (li, lv, ri, rv) =
                    unsafe { (slice(lidx, ln), slice(lval, ln), slice(ridx, rn), slice(rval, rn)) };
                match $func(li, lv, ri, rv) {
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

checked! {
    /// Checked sparse inner product.
    simdist_checked_sparse_dot => checked::sparse_dot;
    /// Checked sparse cosine similarity.
    simdist_checked_sparse_cosine => checked::sparse_cosine;
    /// Checked sparse squared distance.
    simdist_checked_sparse_sl2 => checked::sparse_sl2;
}

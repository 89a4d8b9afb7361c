//! Binary (popcount) entry points. Lengths are in 64-bit words.

use simdist_core::{binary, checked};

use crate::error::{SimdistStatus, set_error};
use crate::types::{require, slice};

macro_rules! pair {
    ($($(#[$meta:meta])* $name:ident => $func:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// # Safety
            ///
            /// `a` and `b` must each be valid for `words` reads, with bits past
            /// the logical length cleared.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(a: *const u64, b: *const u64, words: usize) -> f32 {
                // SAFETY: Caller guarantees both pointers are valid for `words` elements.
                let (a, b) = unsafe { (slice(a, words), slice(b, words)) };
                $func(a, b)
            }
        )*
    };
}

/// Number of set bits in `words` words.
///
/// # Safety
///
/// `a` must be valid for `words` reads.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn simdist_binary_cnt(a: *const u64, words: usize) -> f32 {
    // SAFETY: Caller guarantees a is valid for `words` elements.
    binary::cnt(unsafe { slice(a, words) })
}

pair! {
    /// `popcount(a & b)`.
    simdist_binary_dot => binary::dot;
    /// Hamming distance, `popcount(a ^ b)`.
    simdist_binary_sl2 => binary::sl2;
    /// Binary cosine similarity.
    simdist_binary_cosine => binary::cosine;
    /// `popcount(a | b)`.
    simdist_binary_or_count => binary::or_count;
    /// Jaccard similarity.
    simdist_binary_jaccard => binary::jaccard;
}

macro_rules! checked_pair {
    ($($(#[$meta:meta])* $name:ident => $func:path;)*) => {
        $(
            $(#[$meta])*
            ///
            /// Both operands hold `bits` logical bits in `words` words. Returns
            /// `ErrorTrailingBits` if `bits` does not fit or a bit past it is set.
            ///
            /// # Safety
            ///
            /// `a` and `b` must each be valid for `words` reads and `out` for
            /// one write. Null pointers are reported, not dereferenced.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(
                a: *const u64,
                b: *const u64,
                words: usize,
                bits: usize,
                out: *mut f32,
            ) -> SimdistStatus {
                require!(a, words; b, words => out);
                // SAFETY: Pointers are non-null and caller guarantees their extents.
                let (a, b) = unsafe { (slice(a, words), slice(b, words)) };
                match $func(a, b, bits) {
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
    /// Checked `popcount(a & b)`.
    simdist_checked_binary_dot => checked::binary_dot;
    /// Checked Hamming distance.
    simdist_checked_binary_sl2 => checked::binary_sl2;
    /// Checked binary cosine similarity.
    simdist_checked_binary_cosine => checked::binary_cosine;
    /// Checked Jaccard similarity.
    simdist_checked_binary_jaccard => checked::binary_jaccard;
}

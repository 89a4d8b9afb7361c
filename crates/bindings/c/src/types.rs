//! Conversions from C pointer/length pairs.

use half::f16;

/// Borrows `len` elements starting at `ptr`; a zero length accepts null.
///
/// # Safety
///
/// When `len > 0`, `ptr` must be valid for `len` reads of `T` for `'a`.
pub unsafe fn slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 {
        &[]
    } else {
        // SAFETY: Caller guarantees ptr is valid for len elements.
        unsafe { std::slice::from_raw_parts(ptr, len) }
    }
}

/// Reinterprets `uint16_t` bit patterns as half floats.
///
/// # Safety
///
/// Same contract as [`slice`].
pub unsafe fn halves<'a>(ptr: *const u16, len: usize) -> &'a [f16] {
    // SAFETY: f16 is repr(transparent) over u16; the caller upholds the rest.
    unsafe { slice(ptr.cast::<f16>(), len) }
}

/// Returns `ErrorNullPointer` from the enclosing function if a non-empty
/// input or the output pointer is null.
macro_rules! require {
    ($($ptr:expr, $len:expr);* => $out:expr) => {{
        if $out.is_null() $(|| ($len > 0 && $ptr.is_null()))* {
            $crate::error::set_last_error("Null pointer");
            return $crate::error::SimdistStatus::ErrorNullPointer;
        }
    }};
}

pub(crate) use require;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slice_accepts_null() {
        // SAFETY: A zero length never dereferences.
        let empty: &[f32] = unsafe { slice(std::ptr::null(), 0) };
        assert!(empty.is_empty());
    }

    #[test]
    fn test_halves_reinterprets_bits() {
        let bits = [f16::ONE.to_bits(), f16::from_f32(-2.5).to_bits()];
        // SAFETY: bits is valid for two reads.
        let values = unsafe { halves(bits.as_ptr(), bits.len()) };
        assert_eq!(values, &[f16::ONE, f16::from_f32(-2.5)]);
    }
}

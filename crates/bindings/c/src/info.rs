//! Library and dispatch introspection.

use std::ffi::CStr;
use std::os::raw::c_char;

use simdist_core::dispatch::{self, Tier};
use simdist_core::Operation;

use crate::error::{set_last_error, str_from_ptr};

fn tier_name(tier: Tier) -> &'static CStr {
    match tier {
        Tier::Scalar => c"scalar",
        Tier::V2 => c"v2",
        Tier::Neon => c"neon",
        Tier::V3 => c"v3",
        Tier::V4 => c"v4",
        Tier::V4Vpopcntdq => c"v4_avx512vpopcntdq",
        Tier::Sve => c"sve",
        Tier::V4Fp16 => c"v4_avx512fp16",
    }
}

/// Returns the library version string. The pointer is static and must NOT be freed.
#[unsafe(no_mangle)]
pub extern "C" fn simdist_version() -> *const c_char {
    // Include a trailing NUL in the byte literal.
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr().cast::<c_char>()
}

/// Returns the most preferred tier the CPU supports. The pointer is static.
#[unsafe(no_mangle)]
pub extern "C" fn simdist_best_tier() -> *const c_char {
    tier_name(dispatch::detect().best()).as_ptr()
}

/// Returns the tier dispatch selected for the named operation, or null if
/// the name is unknown (check `simdist_last_error()`). The pointer is static.
///
/// # Safety
///
/// `operation` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn simdist_selected_tier(operation: *const c_char) -> *const c_char {
    // SAFETY: Caller guarantees operation is null or a valid C string.
    let Ok(name) = (unsafe { str_from_ptr(operation) }) else {
        return std::ptr::null();
    };
    match name.parse::<Operation>() {
        Ok(op) => tier_name(dispatch::table().tier_of(op)).as_ptr(),
        Err(e) => {
            set_last_error(&e.to_string());
            std::ptr::null()
        }
    }
}

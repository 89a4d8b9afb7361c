//! Thread-local error handling for the C FFI layer.
//!
//! Follows the same pattern as SQLite and libgit2: functions return a status
//! code and store a detailed error message in thread-local storage.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use simdist_common::Error;

/// Status codes returned by checked C FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdistStatus {
    Ok = 0,
    ErrorLengthMismatch = 1,
    ErrorUnsortedIndices = 2,
    ErrorSparseLength = 3,
    ErrorTrailingBits = 4,
    ErrorUnknownOperation = 5,
    ErrorOperandMismatch = 6,
    ErrorConfig = 7,
    ErrorNullPointer = 8,
    ErrorInvalidUtf8 = 9,
}

impl From<&Error> for SimdistStatus {
    fn from(err: &Error) -> Self {
        match err {
            Error::LengthMismatch { .. } => SimdistStatus::ErrorLengthMismatch,
            Error::UnsortedIndices { .. } => SimdistStatus::ErrorUnsortedIndices,
            Error::SparseLengthMismatch { .. } => SimdistStatus::ErrorSparseLength,
            Error::TrailingBits { .. } | Error::BitLengthOverflow { .. } => {
                SimdistStatus::ErrorTrailingBits
            }
            Error::UnknownOperation(_) | Error::UnknownTier(_) => {
                SimdistStatus::ErrorUnknownOperation
            }
            Error::OperandMismatch { .. } => SimdistStatus::ErrorOperandMismatch,
            Error::Config(_) => SimdistStatus::ErrorConfig,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via [`simdist_last_error`].
pub fn set_last_error(msg: &str) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

/// Store an error from a [`simdist_common::Error`] and return the
/// corresponding status code.
pub fn set_error(err: &Error) -> SimdistStatus {
    set_last_error(&err.to_string());
    SimdistStatus::from(err)
}

/// Returns the last error message, or null if no error.
///
/// The returned pointer is valid until the next failing call on this thread.
/// The caller must NOT free this pointer.
#[unsafe(no_mangle)]
pub extern "C" fn simdist_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        cell.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |s| s.as_ptr())
    })
}

/// Clears the last error.
#[unsafe(no_mangle)]
pub extern "C" fn simdist_clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Extract a `&str` from a C string pointer, returning an error status if null
/// or invalid UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub unsafe fn str_from_ptr<'a>(ptr: *const c_char) -> Result<&'a str, SimdistStatus> {
    if ptr.is_null() {
        set_last_error("Null string pointer");
        return Err(SimdistStatus::ErrorNullPointer);
    }
    // SAFETY: Caller guarantees ptr is a valid, null-terminated C string.
    unsafe { CStr::from_ptr(ptr) }.to_str().map_err(|_| {
        set_last_error("Invalid UTF-8 in string");
        SimdistStatus::ErrorInvalidUtf8
    })
}

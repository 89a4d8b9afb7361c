//! C FFI bindings for the simdist kernels.
//!
//! This crate exposes a C-compatible API that can be consumed by any language
//! with C interop support (Go via CGO, Ruby via FFI, Java via JNI, etc.).
//!
//! # Unchecked Kernels
//!
//! `simdist_f32_*`, `simdist_f16_*`, `simdist_binary_*` and `simdist_sparse_*`
//! take raw pointers plus lengths and return the result directly. They call
//! the dispatched kernel with no validation: mismatched lengths, dangling
//! pointers, unsorted sparse indices or dirty trailing bits are undefined
//! behaviour. f16 values are passed as their `uint16_t` bit patterns.
//!
//! # Checked Kernels
//!
//! `simdist_checked_*` validate their inputs, write the result through an
//! output pointer and return a [`SimdistStatus`]. On error, call
//! [`simdist_last_error`] to retrieve a human-readable message. The error is
//! thread-local and valid until the next failing call on the same thread.
//!
//! # Thread Safety
//!
//! Every function is reentrant. Dispatch is resolved once per process on the
//! first call from any thread.

#![allow(unsafe_code)]

mod binary;
mod dense;
mod error;
mod info;
mod sparse;
mod types;

pub use error::{SimdistStatus, simdist_clear_error, simdist_last_error};

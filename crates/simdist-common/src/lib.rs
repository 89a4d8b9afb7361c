//! # simdist-common
//!
//! Shared building blocks for the simdist workspace.
//!
//! This crate has no knowledge of CPU features or kernels. It defines the
//! operand views the kernel crates consume and the error type used by every
//! checked entry point.
//!
//! ## Modules
//!
//! - [`types`] - Operand views: [`SparseSlice`](types::SparseSlice), [`BitVector`](types::BitVector)
//! - [`utils`] - Error types ([`Error`](utils::Error), [`ConfigError`](utils::error::ConfigError))

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

pub use half::f16;
pub use types::{BitVector, SparseSlice};
pub use utils::{Error, Result};

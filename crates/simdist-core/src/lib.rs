//! # simdist-core
//!
//! Capability-dispatched SIMD kernels for vector similarity.
//!
//! Every metric has a portable implementation plus implementations for the
//! instruction sets that speed it up. The fastest one the running CPU
//! supports is chosen once per process; after that a call is a single
//! indirect jump.
//!
//! ## Modules
//!
//! - [`vecf32`] / [`vecf16`] - Dense reductions and distances
//! - [`binary`] - Popcount metrics over bit-packed words
//! - [`sparse`] - Merge-based intersection metrics over sorted index/value pairs
//! - [`checked`] - Validating wrappers and by-name evaluation
//! - [`dispatch`] - Capability detection and the resolved kernel table
//! - [`config`] - Limits on which tiers dispatch may select
//!
//! ## Example
//!
//! ```
//! use simdist_core::vecf32;
//!
//! let a = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let b = [5.0, 4.0, 3.0, 2.0, 1.0];
//! assert!((vecf32::dot(&a, &b) - 35.0).abs() < 1e-5);
//! assert!((vecf32::sl2(&a, &b) - 40.0).abs() < 1e-5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(feature = "nightly-fp16", feature(stdarch_x86_avx512_f16))]

pub mod binary;
pub mod checked;
pub mod config;
pub mod dispatch;
pub mod sparse;
pub mod vecf16;
pub mod vecf32;

mod kernels;
mod operation;

pub use checked::evaluate;
pub use config::DispatchConfig;
pub use dispatch::{Capabilities, DispatchTable, Tier};
pub use kernels::{Element, MinMaxKernel, PairKernel, SparseKernel, UnaryKernel};
pub use operation::{Family, Operands, Operation, Output};
pub use simdist_common::{BitVector, Error, Result, SparseSlice, f16};

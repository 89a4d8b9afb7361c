//! Operand views consumed by the kernels.
//!
//! | Type | Layout | Kernel family |
//! |------|--------|---------------|
//! | `&[f32]` / `&[f16]` | dense, one value per dimension | dense reductions |
//! | [`BitVector`] | `u64` words, one bit per dimension | popcount |
//! | [`SparseSlice`] | sorted `u32` indices with parallel values | sparse intersection |

mod bits;
mod sparse;

pub use bits::BitVector;
pub use sparse::SparseSlice;

//! Validating entry points.
//!
//! The functions in [`crate::vecf32`], [`crate::binary`] and friends trust
//! their inputs and panic on mismatched lengths. The ones here check every
//! precondition first and report violations as [`Error`]s, which is what a
//! caller handling untrusted data wants.
//!
//! [`evaluate`] additionally picks the kernel by [`Operation`] at runtime.

use half::f16;
use simdist_common::{BitVector, Error, Result, SparseSlice};

use crate::dispatch::{Kernel, table};
use crate::operation::{Operands, Operation, Output};

// ============================================================================
// Dense
// ============================================================================

fn check_pair<T>(a: &[T], b: &[T]) -> Result<()> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        })
    }
}

macro_rules! checked_dense {
    ($($(#[$meta:meta])* $name:ident: $ty:ty => $family:ident.$op:ident;)*) => {
        $(
            $(#[$meta])*
            ///
            /// # Errors
            ///
            /// Returns [`Error::LengthMismatch`] if the vectors differ in length.
            pub fn $name(a: &[$ty], b: &[$ty]) -> Result<f32> {
                check_pair(a, b)?;
                Ok((table().$family.$op.kernel)(a, b))
            }
        )*
    };
}

checked_dense! {
    /// Checked f32 inner product.
    f32_dot: f32 => f32.dot;
    /// Checked f32 cosine similarity.
    f32_cosine: f32 => f32.cosine;
    /// Checked f32 squared Euclidean distance.
    f32_sl2: f32 => f32.sl2;
    /// Checked f16 inner product.
    f16_dot: f16 => f16.dot;
    /// Checked f16 cosine similarity.
    f16_cosine: f16 => f16.cosine;
    /// Checked f16 squared Euclidean distance.
    f16_sl2: f16 => f16.sl2;
}

// ============================================================================
// Binary
// ============================================================================

fn check_bits(a: &[u64], b: &[u64], bits: usize) -> Result<()> {
    check_pair(a, b)?;
    BitVector::check_trailing(a, bits)?;
    BitVector::check_trailing(b, bits)
}

macro_rules! checked_binary {
    ($($(#[$meta:meta])* $name:ident => $op:ident;)*) => {
        $(
            $(#[$meta])*
            ///
            /// `bits` is the logical length shared by both operands.
            ///
            /// # Errors
            ///
            /// Returns [`Error::LengthMismatch`] if the word counts differ,
            /// [`Error::BitLengthOverflow`] if `bits` does not fit, or
            /// [`Error::TrailingBits`] if either operand has bits set past `bits`.
            pub fn $name(a: &[u64], b: &[u64], bits: usize) -> Result<f32> {
                check_bits(a, b, bits)?;
                Ok((table().binary.$op.kernel)(a, b))
            }
        )*
    };
}

/// Checked popcount.
///
/// # Errors
///
/// Returns [`Error::BitLengthOverflow`] or [`Error::TrailingBits`] if `a`
/// does not hold a clean `bits`-bit vector.
pub fn binary_cnt(a: &[u64], bits: usize) -> Result<f32> {
    BitVector::check_trailing(a, bits)?;
    Ok((table().binary.cnt.kernel)(a))
}

checked_binary! {
    /// Checked `popcount(a & b)`.
    binary_dot => dot;
    /// Checked Hamming distance.
    binary_sl2 => sl2;
    /// Checked binary cosine similarity.
    binary_cosine => cosine;
    /// Checked `popcount(a | b)`.
    binary_or_count => or_count;
    /// Checked Jaccard similarity.
    binary_jaccard => jaccard;
}

// ============================================================================
// Sparse
// ============================================================================

macro_rules! checked_sparse {
    ($($(#[$meta:meta])* $name:ident: $ty:ty => $family:ident.$op:ident;)*) => {
        $(
            $(#[$meta])*
            ///
            /// # Errors
            ///
            /// Returns [`Error::SparseLengthMismatch`] if either side has
            /// different numbers of indices and values, or
            /// [`Error::UnsortedIndices`] if either index array is not
            /// strictly increasing.
            pub fn $name(lidx: &[u32], lval: &[$ty], ridx: &[u32], rval: &[$ty]) -> Result<f32> {
                SparseSlice::new(lidx, lval)?;
                SparseSlice::new(ridx, rval)?;
                Ok((table().$family.$op.kernel)(lidx, lval, ridx, rval))
            }
        )*
    };
}

checked_sparse! {
    /// Checked sparse inner product.
    sparse_dot: f32 => sparse_f32.dot;
    /// Checked sparse cosine similarity.
    sparse_cosine: f32 => sparse_f32.cosine;
    /// Checked sparse squared distance.
    sparse_sl2: f32 => sparse_f32.sl2;
    /// Checked sparse inner product with f16 values.
    sparse_f16_dot: f16 => sparse_f16.dot;
    /// Checked sparse cosine similarity with f16 values.
    sparse_f16_cosine: f16 => sparse_f16.cosine;
    /// Checked sparse squared distance with f16 values.
    sparse_f16_sl2: f16 => sparse_f16.sl2;
}

// ============================================================================
// By name
// ============================================================================

/// Runs `op` on `operands` with the kernel dispatch selected for it.
///
/// Sparse operands are trusted to be sorted, since [`SparseSlice`] already
/// checked that unless it was built with `new_unchecked`.
///
/// # Errors
///
/// Returns [`Error::OperandMismatch`] if the operand shape does not match the
/// operation, [`Error::LengthMismatch`] if paired operands differ in length,
/// or a bit-layout error if a [`BitVector`] does not hold its own length.
///
/// # Example
///
/// ```
/// use simdist_core::{Operands, Operation, Output, evaluate};
///
/// let a = [3.0, 4.0];
/// let op: Operation = "f32_sum_sq".parse().unwrap();
/// assert_eq!(evaluate(op, Operands::F32(&a)).unwrap(), Output::Scalar(25.0));
/// ```
pub fn evaluate(op: Operation, operands: Operands<'_>) -> Result<Output> {
    let selected = table().get(op);
    let value = match (selected.kernel, operands) {
        (Kernel::F32Reduce(k), Operands::F32(a)) => k(a),
        (Kernel::F32MinMax(k), Operands::F32(a)) => return Ok(min_max(k(a))),
        (Kernel::F32Pair(k), Operands::F32Pair(a, b)) => {
            check_pair(a, b)?;
            k(a, b)
        }
        (Kernel::F16Reduce(k), Operands::F16(a)) => k(a),
        (Kernel::F16MinMax(k), Operands::F16(a)) => return Ok(min_max(k(a))),
        (Kernel::F16Pair(k), Operands::F16Pair(a, b)) => {
            check_pair(a, b)?;
            k(a, b)
        }
        (Kernel::BitReduce(k), Operands::Bits(a)) => {
            BitVector::check_trailing(a.words(), a.len())?;
            k(a.words())
        }
        (Kernel::BitPair(k), Operands::BitsPair(a, b)) => {
            if a.len() != b.len() {
                return Err(Error::LengthMismatch {
                    left: a.len(),
                    right: b.len(),
                });
            }
            check_bits(a.words(), b.words(), a.len())?;
            k(a.words(), b.words())
        }
        (Kernel::SparseF32(k), Operands::Sparse(l, r)) => {
            k(l.indices(), l.values(), r.indices(), r.values())
        }
        (Kernel::SparseF16(k), Operands::SparseF16(l, r)) => {
            k(l.indices(), l.values(), r.indices(), r.values())
        }
        _ => {
            return Err(Error::OperandMismatch {
                operation: op.name(),
                expected: op.expected_operands(),
            });
        }
    };
    Ok(Output::Scalar(value))
}

fn min_max((min, max): (f32, f32)) -> Output {
    Output::MinMax { min, max }
}

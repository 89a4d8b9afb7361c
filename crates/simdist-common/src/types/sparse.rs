//! Borrowed sparse vectors.

use crate::utils::{Error, Result};

/// A sparse vector borrowed from caller memory.
///
/// Dimension `indices[i]` holds `values[i]`; every other dimension is zero.
/// Indices are strictly increasing. [`SparseSlice::new`] verifies this, while
/// [`SparseSlice::new_unchecked`] trusts the caller and only checks that the
/// two arrays have the same length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseSlice<'a, V> {
    indices: &'a [u32],
    values: &'a [V],
}

impl<'a, V> SparseSlice<'a, V> {
    /// Creates a sparse view, validating lengths and index order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SparseLengthMismatch`] if the arrays differ in length,
    /// or [`Error::UnsortedIndices`] if an index is not greater than the one
    /// before it.
    pub fn new(indices: &'a [u32], values: &'a [V]) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(Error::SparseLengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        if let Some(position) = first_unsorted(indices) {
            return Err(Error::UnsortedIndices { position });
        }
        Ok(Self { indices, values })
    }

    /// Creates a sparse view without checking index order.
    ///
    /// Kernels stay memory-safe on unsorted input but return unspecified
    /// results.
    ///
    /// # Panics
    ///
    /// Panics if `indices` and `values` have different lengths.
    #[must_use]
    pub fn new_unchecked(indices: &'a [u32], values: &'a [V]) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "sparse indices and values must have equal length"
        );
        Self { indices, values }
    }

    /// Returns the index array.
    #[must_use]
    pub const fn indices(&self) -> &'a [u32] {
        self.indices
    }

    /// Returns the value array.
    #[must_use]
    pub const fn values(&self) -> &'a [V] {
        self.values
    }

    /// Returns the number of stored (nonzero) entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if no entries are stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Position of the first index that breaks strict ordering, if any.
fn first_unsorted(indices: &[u32]) -> Option<usize> {
    indices
        .windows(2)
        .position(|w| w[0] >= w[1])
        .map(|p| p + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_sorted() {
        let sparse = SparseSlice::new(&[1, 3, 5], &[1.0f32, 2.0, 3.0]).unwrap();
        assert_eq!(sparse.len(), 3);
        assert_eq!(sparse.indices(), &[1, 3, 5]);
        assert!(!sparse.is_empty());
    }

    #[test]
    fn test_new_accepts_empty() {
        let sparse = SparseSlice::<f32>::new(&[], &[]).unwrap();
        assert!(sparse.is_empty());
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = SparseSlice::new(&[1, 2], &[1.0f32]).unwrap_err();
        assert_eq!(
            err,
            Error::SparseLengthMismatch {
                indices: 2,
                values: 1
            }
        );
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = SparseSlice::new(&[1, 4, 4, 7], &[1.0f32; 4]).unwrap_err();
        assert_eq!(err, Error::UnsortedIndices { position: 2 });
    }

    #[test]
    fn test_new_rejects_decreasing() {
        let err = SparseSlice::new(&[9, 2], &[1.0f32; 2]).unwrap_err();
        assert_eq!(err, Error::UnsortedIndices { position: 1 });
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_new_unchecked_panics_on_length_mismatch() {
        let _ = SparseSlice::new_unchecked(&[1, 2, 3], &[1.0f32]);
    }
}

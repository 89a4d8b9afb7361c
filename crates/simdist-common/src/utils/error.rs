//! Error types for checked kernel entry points.
//!
//! The kernels themselves never fail: they return IEEE-754 values, including
//! NaN for the cosine of a zero vector. Everything in this module describes a
//! violated *precondition* that a checked wrapper detected before calling a
//! kernel, or a configuration problem found while setting up dispatch.

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by checked entry points, parsing, and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two dense operands (or two bit-vectors) have different lengths.
    #[error("length mismatch: left has {left} elements, right has {right}")]
    LengthMismatch {
        /// Length of the left operand.
        left: usize,
        /// Length of the right operand.
        right: usize,
    },

    /// Sparse indices are not strictly increasing.
    #[error("sparse indices must be strictly increasing (violated at position {position})")]
    UnsortedIndices {
        /// Position of the first index that is not greater than its predecessor.
        position: usize,
    },

    /// A sparse vector has a different number of indices and values.
    #[error("sparse vector has {indices} indices but {values} values")]
    SparseLengthMismatch {
        /// Number of indices.
        indices: usize,
        /// Number of values.
        values: usize,
    },

    /// A bit-vector has set bits beyond its logical length.
    #[error("bit-vector of {bits} bits has set bits past the end of its {words} words")]
    TrailingBits {
        /// Logical length in bits.
        bits: usize,
        /// Storage length in words.
        words: usize,
    },

    /// A bit length does not fit in the supplied words.
    #[error("{bits} bits do not fit in {words} words")]
    BitLengthOverflow {
        /// Logical length in bits.
        bits: usize,
        /// Storage length in words.
        words: usize,
    },

    /// The operands passed to an operation have the wrong shape.
    #[error("operation `{operation}` expects {expected}")]
    OperandMismatch {
        /// Name of the operation.
        operation: &'static str,
        /// Human-readable description of the expected operands.
        expected: &'static str,
    },

    /// An operation name could not be parsed.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// A capability tier name could not be parsed.
    #[error("unknown capability tier: {0}")]
    UnknownTier(String),

    /// Dispatch configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from validating a dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The baseline tier cannot be disabled: every operation must stay resolvable.
    #[error("the scalar tier cannot be disabled")]
    ScalarDisabled,

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let err = Error::LengthMismatch { left: 3, right: 4 };
        assert_eq!(
            err.to_string(),
            "length mismatch: left has 3 elements, right has 4"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: Error = ConfigError::ScalarDisabled.into();
        assert_eq!(err.to_string(), "the scalar tier cannot be disabled");
        assert!(matches!(err, Error::Config(ConfigError::ScalarDisabled)));
    }

    #[test]
    fn test_operand_mismatch_display() {
        let err = Error::OperandMismatch {
            operation: "f32_dot",
            expected: "two dense f32 vectors",
        };
        assert_eq!(
            err.to_string(),
            "operation `f32_dot` expects two dense f32 vectors"
        );
    }
}

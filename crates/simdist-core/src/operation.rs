//! The operation registry.
//!
//! [`Operation`] names every kernel the library dispatches, so callers (the
//! CLI, configuration files, the C surface) can refer to them by string.

use std::fmt;
use std::str::FromStr;

use half::f16;
use serde::{Deserialize, Serialize};
use simdist_common::{BitVector, Error, SparseSlice};

/// Every dispatched operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Sum of f32 elements.
    F32Sum,
    /// Sum of absolute f32 values.
    F32AbsSum,
    /// Sum of squared f32 values.
    F32SumSq,
    /// Smallest and largest f32 element.
    F32MinMax,
    /// f32 inner product.
    F32Dot,
    /// f32 cosine similarity.
    F32Cosine,
    /// f32 squared Euclidean distance.
    F32Sl2,
    /// Sum of f16 elements.
    F16Sum,
    /// Sum of absolute f16 values.
    F16AbsSum,
    /// Sum of squared f16 values.
    F16SumSq,
    /// Smallest and largest f16 element.
    F16MinMax,
    /// f16 inner product.
    F16Dot,
    /// f16 cosine similarity.
    F16Cosine,
    /// f16 squared Euclidean distance.
    F16Sl2,
    /// Popcount of a bit vector.
    BinaryCnt,
    /// Popcount of `a & b`.
    BinaryDot,
    /// Popcount of `a ^ b` (Hamming distance).
    BinarySl2,
    /// Binary cosine similarity.
    BinaryCosine,
    /// Popcount of `a | b`.
    BinaryOrCount,
    /// Jaccard similarity of two bit sets.
    BinaryJaccard,
    /// Sparse inner product with f32 values.
    SparseDot,
    /// Sparse cosine similarity with f32 values.
    SparseCosine,
    /// Sparse squared distance with f32 values.
    SparseSl2,
    /// Sparse inner product with f16 values.
    SparseF16Dot,
    /// Sparse cosine similarity with f16 values.
    SparseF16Cosine,
    /// Sparse squared distance with f16 values.
    SparseF16Sl2,
}

/// The data kind an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Dense single precision.
    DenseF32,
    /// Dense half precision.
    DenseF16,
    /// Bit-packed words.
    Binary,
    /// Sparse with f32 values.
    SparseF32,
    /// Sparse with f16 values.
    SparseF16,
}

impl Family {
    /// Returns the family name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DenseF32 => "f32",
            Self::DenseF16 => "f16",
            Self::Binary => "binary",
            Self::SparseF32 => "sparse_f32",
            Self::SparseF16 => "sparse_f16",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Operation {
    /// Every operation, grouped by family.
    pub const ALL: [Operation; 26] = [
        Operation::F32Sum,
        Operation::F32AbsSum,
        Operation::F32SumSq,
        Operation::F32MinMax,
        Operation::F32Dot,
        Operation::F32Cosine,
        Operation::F32Sl2,
        Operation::F16Sum,
        Operation::F16AbsSum,
        Operation::F16SumSq,
        Operation::F16MinMax,
        Operation::F16Dot,
        Operation::F16Cosine,
        Operation::F16Sl2,
        Operation::BinaryCnt,
        Operation::BinaryDot,
        Operation::BinarySl2,
        Operation::BinaryCosine,
        Operation::BinaryOrCount,
        Operation::BinaryJaccard,
        Operation::SparseDot,
        Operation::SparseCosine,
        Operation::SparseSl2,
        Operation::SparseF16Dot,
        Operation::SparseF16Cosine,
        Operation::SparseF16Sl2,
    ];

    /// Returns the canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::F32Sum => "f32_sum",
            Self::F32AbsSum => "f32_abs_sum",
            Self::F32SumSq => "f32_sum_sq",
            Self::F32MinMax => "f32_min_max",
            Self::F32Dot => "f32_dot",
            Self::F32Cosine => "f32_cosine",
            Self::F32Sl2 => "f32_sl2",
            Self::F16Sum => "f16_sum",
            Self::F16AbsSum => "f16_abs_sum",
            Self::F16SumSq => "f16_sum_sq",
            Self::F16MinMax => "f16_min_max",
            Self::F16Dot => "f16_dot",
            Self::F16Cosine => "f16_cosine",
            Self::F16Sl2 => "f16_sl2",
            Self::BinaryCnt => "binary_cnt",
            Self::BinaryDot => "binary_dot",
            Self::BinarySl2 => "binary_sl2",
            Self::BinaryCosine => "binary_cosine",
            Self::BinaryOrCount => "binary_or_count",
            Self::BinaryJaccard => "binary_jaccard",
            Self::SparseDot => "sparse_dot",
            Self::SparseCosine => "sparse_cosine",
            Self::SparseSl2 => "sparse_sl2",
            Self::SparseF16Dot => "sparse_f16_dot",
            Self::SparseF16Cosine => "sparse_f16_cosine",
            Self::SparseF16Sl2 => "sparse_f16_sl2",
        }
    }

    /// Returns the family the operation belongs to.
    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::F32Sum
            | Self::F32AbsSum
            | Self::F32SumSq
            | Self::F32MinMax
            | Self::F32Dot
            | Self::F32Cosine
            | Self::F32Sl2 => Family::DenseF32,
            Self::F16Sum
            | Self::F16AbsSum
            | Self::F16SumSq
            | Self::F16MinMax
            | Self::F16Dot
            | Self::F16Cosine
            | Self::F16Sl2 => Family::DenseF16,
            Self::BinaryCnt
            | Self::BinaryDot
            | Self::BinarySl2
            | Self::BinaryCosine
            | Self::BinaryOrCount
            | Self::BinaryJaccard => Family::Binary,
            Self::SparseDot | Self::SparseCosine | Self::SparseSl2 => Family::SparseF32,
            Self::SparseF16Dot | Self::SparseF16Cosine | Self::SparseF16Sl2 => Family::SparseF16,
        }
    }

    /// Returns true if the operation takes two operands.
    #[must_use]
    pub const fn takes_pair(self) -> bool {
        !matches!(
            self,
            Self::F32Sum
                | Self::F32AbsSum
                | Self::F32SumSq
                | Self::F32MinMax
                | Self::F16Sum
                | Self::F16AbsSum
                | Self::F16SumSq
                | Self::F16MinMax
                | Self::BinaryCnt
        )
    }

    /// Describes the operands the operation expects, for error messages.
    #[must_use]
    pub const fn expected_operands(self) -> &'static str {
        match (self.family(), self.takes_pair()) {
            (Family::DenseF32, false) => "one f32 vector",
            (Family::DenseF32, true) => "two f32 vectors",
            (Family::DenseF16, false) => "one f16 vector",
            (Family::DenseF16, true) => "two f16 vectors",
            (Family::Binary, false) => "one bit vector",
            (Family::Binary, true) => "two bit vectors",
            (Family::SparseF32, _) => "two sparse vectors with f32 values",
            (Family::SparseF16, _) => "two sparse vectors with f16 values",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    /// Parses an operation name (case-insensitive, `-` and `_` interchangeable).
    ///
    /// Accepts a few common aliases: `cos`, `ip`/`inner_product` for dot,
    /// `l2`/`squared_l2` for sl2, `sumsq`, `hamming` and `popcount`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        if let Some(op) = Self::ALL.iter().find(|op| op.name() == normalized) {
            return Ok(*op);
        }
        let (prefix, metric) = normalized
            .rsplit_once('_')
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))?;
        let (prefix, metric) = match (prefix.rsplit_once('_'), metric) {
            (Some((p, "inner")), "product") => (p, "dot"),
            (Some((p, "squared")), "l2") => (p, "sl2"),
            _ => (prefix, metric),
        };
        let metric = match metric {
            "cos" => "cosine",
            "ip" => "dot",
            "l2" | "hamming" => "sl2",
            "sumsq" => "sum_sq",
            "popcount" => "cnt",
            other => other,
        };
        let canonical = format!("{prefix}_{metric}");
        Self::ALL
            .iter()
            .find(|op| op.name() == canonical)
            .copied()
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

/// Borrowed inputs for [`crate::evaluate`].
#[derive(Debug, Clone, Copy)]
pub enum Operands<'a> {
    /// One f32 vector.
    F32(&'a [f32]),
    /// Two f32 vectors.
    F32Pair(&'a [f32], &'a [f32]),
    /// One f16 vector.
    F16(&'a [f16]),
    /// Two f16 vectors.
    F16Pair(&'a [f16], &'a [f16]),
    /// One bit vector.
    Bits(&'a BitVector),
    /// Two bit vectors.
    BitsPair(&'a BitVector, &'a BitVector),
    /// Two sparse vectors with f32 values.
    Sparse(SparseSlice<'a, f32>, SparseSlice<'a, f32>),
    /// Two sparse vectors with f16 values.
    SparseF16(SparseSlice<'a, f16>, SparseSlice<'a, f16>),
}

/// The result of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Output {
    /// A single value.
    Scalar(f32),
    /// Smallest and largest element.
    MinMax {
        /// Smallest element.
        min: f32,
        /// Largest element.
        max: f32,
    },
}

impl Output {
    /// Returns the single value, or `None` for a min/max pair.
    #[must_use]
    pub fn as_scalar(self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::MinMax { .. } => None,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::MinMax { min, max } => write!(f, "min={min} max={max}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
            assert_eq!(op.to_string(), op.name());
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
    }

    #[test]
    fn test_aliases() {
        let cases = [
            ("F32-Cosine", Operation::F32Cosine),
            ("f32_cos", Operation::F32Cosine),
            ("f16_ip", Operation::F16Dot),
            ("f32_inner_product", Operation::F32Dot),
            ("f32_l2", Operation::F32Sl2),
            ("f32_squared_l2", Operation::F32Sl2),
            ("f32_sumsq", Operation::F32SumSq),
            ("binary_hamming", Operation::BinarySl2),
            ("binary_popcount", Operation::BinaryCnt),
            ("sparse_cos", Operation::SparseCosine),
            ("sparse_f16_l2", Operation::SparseF16Sl2),
        ];
        for (name, op) in cases {
            assert_eq!(name.parse::<Operation>().unwrap(), op, "{name}");
        }
    }

    #[test]
    fn test_unknown_operation() {
        for name in ["", "dot", "f64_dot", "binary_min_max"] {
            assert!(
                matches!(name.parse::<Operation>(), Err(Error::UnknownOperation(n)) if n == name),
                "{name:?} parsed"
            );
        }
    }

    #[test]
    fn test_family_and_arity() {
        assert_eq!(Operation::F16MinMax.family(), Family::DenseF16);
        assert_eq!(Operation::BinaryJaccard.family(), Family::Binary);
        assert_eq!(Operation::SparseF16Dot.family(), Family::SparseF16);
        assert!(!Operation::BinaryCnt.takes_pair());
        assert!(Operation::SparseDot.takes_pair());
        assert_eq!(Operation::F32Sum.expected_operands(), "one f32 vector");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Operation::BinaryOrCount).unwrap();
        assert_eq!(json, "\"binary_or_count\"");
        let op: Operation = serde_json::from_str("\"sparse_f16_cosine\"").unwrap();
        assert_eq!(op, Operation::SparseF16Cosine);
    }

    #[test]
    fn test_output_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Output::Scalar(1.5)).unwrap(), "1.5");
        let json = serde_json::to_string(&Output::MinMax { min: -1.0, max: 2.0 }).unwrap();
        assert_eq!(json, r#"{"min":-1.0,"max":2.0}"#);
    }
}

//! Resolved kernel tables.

use half::f16;

use super::{Capabilities, Selected, Tier, detect};
use crate::config::DispatchConfig;
use crate::kernels::{self, MinMaxKernel, PairKernel, SparseKernel, UnaryKernel};
use crate::operation::Operation;

/// Selected kernels for one dense element type.
#[derive(Debug, Clone, Copy)]
pub struct DenseTable<T: 'static> {
    /// Sum of elements.
    pub sum: Selected<UnaryKernel<T>>,
    /// Sum of absolute values.
    pub abs_sum: Selected<UnaryKernel<T>>,
    /// Sum of squares.
    pub sum_sq: Selected<UnaryKernel<T>>,
    /// Smallest and largest element.
    pub min_max: Selected<MinMaxKernel<T>>,
    /// Inner product.
    pub dot: Selected<PairKernel<T>>,
    /// Cosine similarity.
    pub cosine: Selected<PairKernel<T>>,
    /// Squared Euclidean distance.
    pub sl2: Selected<PairKernel<T>>,
}

/// Selected kernels for bit-packed vectors.
#[derive(Debug, Clone, Copy)]
pub struct BinaryTable {
    /// Population count.
    pub cnt: Selected<UnaryKernel<u64>>,
    /// Popcount of the intersection.
    pub dot: Selected<PairKernel<u64>>,
    /// Hamming distance.
    pub sl2: Selected<PairKernel<u64>>,
    /// Binary cosine similarity.
    pub cosine: Selected<PairKernel<u64>>,
    /// Popcount of the union.
    pub or_count: Selected<PairKernel<u64>>,
    /// Intersection over union.
    pub jaccard: Selected<PairKernel<u64>>,
}

/// Selected kernels for sparse vectors with one value type.
#[derive(Debug, Clone, Copy)]
pub struct SparseTable<V: 'static> {
    /// Inner product over shared indices.
    pub dot: Selected<SparseKernel<V>>,
    /// Cosine similarity.
    pub cosine: Selected<SparseKernel<V>>,
    /// Squared Euclidean distance, absent indices counting as zero.
    pub sl2: Selected<SparseKernel<V>>,
}

/// Any kernel, tagged by its signature.
#[derive(Debug, Clone, Copy)]
pub enum Kernel {
    /// `fn(&[f32]) -> f32`
    F32Reduce(UnaryKernel<f32>),
    /// `fn(&[f32]) -> (f32, f32)`
    F32MinMax(MinMaxKernel<f32>),
    /// `fn(&[f32], &[f32]) -> f32`
    F32Pair(PairKernel<f32>),
    /// `fn(&[f16]) -> f32`
    F16Reduce(UnaryKernel<f16>),
    /// `fn(&[f16]) -> (f32, f32)`
    F16MinMax(MinMaxKernel<f16>),
    /// `fn(&[f16], &[f16]) -> f32`
    F16Pair(PairKernel<f16>),
    /// `fn(&[u64]) -> f32`
    BitReduce(UnaryKernel<u64>),
    /// `fn(&[u64], &[u64]) -> f32`
    BitPair(PairKernel<u64>),
    /// Sparse vectors with f32 values.
    SparseF32(SparseKernel<f32>),
    /// Sparse vectors with f16 values.
    SparseF16(SparseKernel<f16>),
}

fn tagged<K>(selected: Selected<K>, tag: fn(K) -> Kernel) -> Selected<Kernel> {
    Selected::new(selected.tier, tag(selected.kernel))
}

/// The resolved implementation of every operation.
#[derive(Debug, Clone, Copy)]
pub struct DispatchTable {
    caps: Capabilities,
    /// Dense f32 kernels.
    pub f32: DenseTable<f32>,
    /// Dense f16 kernels.
    pub f16: DenseTable<f16>,
    /// Binary kernels.
    pub binary: BinaryTable,
    /// Sparse kernels with f32 values.
    pub sparse_f32: SparseTable<f32>,
    /// Sparse kernels with f16 values.
    pub sparse_f16: SparseTable<f16>,
}

impl DispatchTable {
    /// Resolves every operation for `caps` under `config`.
    ///
    /// `caps` is intersected with [`detect()`] before selection, so a table
    /// built from a hand-written capability set never holds a kernel the CPU
    /// cannot run.
    #[must_use]
    pub fn resolve(caps: Capabilities, config: &DispatchConfig) -> Self {
        let caps = config.restrict(caps.intersect(detect()));
        Self {
            caps,
            f32: kernels::dense::table_f32(caps),
            f16: kernels::dense::table_f16(caps),
            binary: kernels::binary::table(caps),
            sparse_f32: kernels::sparse::table_f32(caps),
            sparse_f16: kernels::sparse::table_f16(caps),
        }
    }

    /// Resolves a table that only uses the portable kernels.
    #[must_use]
    pub fn scalar() -> Self {
        Self::resolve(Capabilities::BASELINE, &DispatchConfig::scalar_only())
    }

    /// Returns the capability set the table was resolved against.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Returns the selected implementation of `op`.
    #[must_use]
    pub fn get(&self, op: Operation) -> Selected<Kernel> {
        use Kernel as K;
        use Operation as Op;

        let (d32, d16, bin) = (&self.f32, &self.f16, &self.binary);
        let (sp32, sp16) = (&self.sparse_f32, &self.sparse_f16);
        match op {
            Op::F32Sum => tagged(d32.sum, K::F32Reduce),
            Op::F32AbsSum => tagged(d32.abs_sum, K::F32Reduce),
            Op::F32SumSq => tagged(d32.sum_sq, K::F32Reduce),
            Op::F32MinMax => tagged(d32.min_max, K::F32MinMax),
            Op::F32Dot => tagged(d32.dot, K::F32Pair),
            Op::F32Cosine => tagged(d32.cosine, K::F32Pair),
            Op::F32Sl2 => tagged(d32.sl2, K::F32Pair),
            Op::F16Sum => tagged(d16.sum, K::F16Reduce),
            Op::F16AbsSum => tagged(d16.abs_sum, K::F16Reduce),
            Op::F16SumSq => tagged(d16.sum_sq, K::F16Reduce),
            Op::F16MinMax => tagged(d16.min_max, K::F16MinMax),
            Op::F16Dot => tagged(d16.dot, K::F16Pair),
            Op::F16Cosine => tagged(d16.cosine, K::F16Pair),
            Op::F16Sl2 => tagged(d16.sl2, K::F16Pair),
            Op::BinaryCnt => tagged(bin.cnt, K::BitReduce),
            Op::BinaryDot => tagged(bin.dot, K::BitPair),
            Op::BinarySl2 => tagged(bin.sl2, K::BitPair),
            Op::BinaryCosine => tagged(bin.cosine, K::BitPair),
            Op::BinaryOrCount => tagged(bin.or_count, K::BitPair),
            Op::BinaryJaccard => tagged(bin.jaccard, K::BitPair),
            Op::SparseDot => tagged(sp32.dot, K::SparseF32),
            Op::SparseCosine => tagged(sp32.cosine, K::SparseF32),
            Op::SparseSl2 => tagged(sp32.sl2, K::SparseF32),
            Op::SparseF16Dot => tagged(sp16.dot, K::SparseF16),
            Op::SparseF16Cosine => tagged(sp16.cosine, K::SparseF16),
            Op::SparseF16Sl2 => tagged(sp16.sl2, K::SparseF16),
        }
    }

    /// Returns the tier selected for `op`.
    #[must_use]
    pub fn tier_of(&self, op: Operation) -> Tier {
        self.get(op).tier
    }
}

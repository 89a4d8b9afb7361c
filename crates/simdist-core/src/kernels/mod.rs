//! Tier-specific kernel implementations.
//!
//! Every family module holds one sub-module per tier plus a `table` function
//! that picks, for each operation, the most preferred implementation whose
//! tier is in the supplied capability set. The scalar reference in
//! [`scalar`] backs every operation, so selection is total on every target.
//!
//! Tier kernels are `unsafe fn`s compiled with `#[target_feature]`. Each is
//! wrapped in a safe entry with the plain fn-pointer signature the dispatch
//! table stores; entries are only reachable through selection, which checks
//! the detected capabilities first.

use half::f16;
use half::slice::HalfFloatSliceExt;

/// A reduction over one buffer.
pub type UnaryKernel<T> = fn(&[T]) -> f32;

/// A min/max reduction over one buffer.
pub type MinMaxKernel<T> = fn(&[T]) -> (f32, f32);

/// A reduction over two equal-length buffers.
pub type PairKernel<T> = fn(&[T], &[T]) -> f32;

/// A reduction over two sparse vectors given as `(lhs_idx, lhs_val, rhs_idx, rhs_val)`.
pub type SparseKernel<V> = fn(&[u32], &[V], &[u32], &[V]) -> f32;

/// Storage element of a dense or sparse value buffer.
pub trait Element: Copy + Default + Send + Sync + 'static {
    /// True for half-precision storage.
    const HALF: bool;

    /// Widens to the accumulation type.
    fn widen(self) -> f32;

    /// Widens `src` into the equally long `dst`.
    fn widen_slice(src: &[Self], dst: &mut [f32]);
}

impl Element for f32 {
    const HALF: bool = false;

    #[inline(always)]
    fn widen(self) -> f32 {
        self
    }

    #[inline(always)]
    fn widen_slice(src: &[Self], dst: &mut [f32]) {
        dst.copy_from_slice(src);
    }
}

impl Element for f16 {
    const HALF: bool = true;

    #[inline(always)]
    fn widen(self) -> f32 {
        self.to_f32()
    }

    #[inline(always)]
    fn widen_slice(src: &[Self], dst: &mut [f32]) {
        src.convert_to_f32_slice(dst);
    }
}

/// Picks the first listed implementation whose tier is in `caps`.
///
/// Candidates are listed in descending tier order and may carry `cfg`
/// attributes; the arm after `_` is the scalar baseline.
macro_rules! select {
    ($caps:expr, $ty:ty; $($(#[$meta:meta])* $tier:ident => $kernel:path,)* _ => $fallback:path $(,)?) => {{
        #[allow(unused_variables)]
        let caps: $crate::dispatch::Capabilities = $caps;
        #[allow(unused_labels)]
        let selected = 'select: {
            $(
                $(#[$meta])*
                {
                    if caps.contains($crate::dispatch::Tier::$tier) {
                        break 'select $crate::dispatch::Selected::<$ty>::new(
                            $crate::dispatch::Tier::$tier,
                            $kernel,
                        );
                    }
                }
            )*
            $crate::dispatch::Selected::<$ty>::new($crate::dispatch::Tier::Scalar, $fallback)
        };
        selected
    }};
}

/// Generates safe entries for `#[target_feature]` kernels of one tier.
macro_rules! entries {
    ($($name:ident => $kernel:ident $(::<$elem:ty>)? ($($arg:ident: $argty:ty),*) -> $ret:ty;)*) => {
        $(
            #[inline]
            pub(crate) fn $name($($arg: $argty),*) -> $ret {
                // SAFETY: dispatch only selects this entry when the CPU supports the tier.
                unsafe { $kernel $(::<$elem>)? ($($arg),*) }
            }
        )*
    };
}

pub(crate) mod binary;
pub(crate) mod dense;
pub(crate) mod scalar;
pub(crate) mod sparse;
pub(crate) mod tail;

#[cfg(target_arch = "x86_64")]
pub(crate) mod emulate;

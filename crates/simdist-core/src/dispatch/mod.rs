//! Capability detection and kernel selection.
//!
//! Every operation has one implementation per tier it supports, always
//! including [`Tier::Scalar`]. Selection picks the most preferred tier that is
//! both implemented and present in the capability set, so it is total on
//! every target.
//!
//! The process-wide [`table()`] is resolved once from the detected
//! capabilities and the environment configuration, then cached. After that a
//! kernel call is an indirect call through a cached fn pointer.
//!
//! # Example
//!
//! ```
//! use simdist_core::dispatch::{self, Tier};
//! use simdist_core::Operation;
//!
//! let selected = dispatch::table().get(Operation::F32Dot);
//! assert!(dispatch::detect().contains(selected.tier));
//! assert!(dispatch::detect().contains(Tier::Scalar));
//! ```

mod detect;
mod table;

pub use detect::{Capabilities, Tier, detect};
pub use table::{BinaryTable, DenseTable, DispatchTable, Kernel, SparseTable};

use std::sync::OnceLock;

use crate::config::DispatchConfig;
use crate::operation::Operation;

/// A kernel together with the tier it was selected from.
#[derive(Debug, Clone, Copy)]
pub struct Selected<K> {
    /// Tier the implementation belongs to.
    pub tier: Tier,
    /// The implementation.
    pub kernel: K,
}

impl<K> Selected<K> {
    /// Pairs a kernel with its tier.
    pub const fn new(tier: Tier, kernel: K) -> Self {
        Self { tier, kernel }
    }
}

static TABLE: OnceLock<DispatchTable> = OnceLock::new();

/// Returns the process-wide dispatch table, resolving it on first use.
///
/// Resolution reads [`DispatchConfig::from_env`]. An invalid configuration is
/// logged and replaced by the default.
pub fn table() -> &'static DispatchTable {
    TABLE.get_or_init(|| {
        let mut config = DispatchConfig::from_env();
        if let Err(e) = config.validate() {
            tracing::warn!("Invalid dispatch configuration, using defaults: {e}");
            config = DispatchConfig::default();
        }
        let detected = detect();
        if let Some(max) = config.max_tier
            && !detected.contains(max)
        {
            tracing::warn!(tier = %max, detected = %detected, "Configured tier cap is not supported by this CPU");
        }
        let table = DispatchTable::resolve(detected, &config);
        tracing::info!(
            f32 = %table.f32.dot.tier,
            f16 = %table.f16.dot.tier,
            binary = %table.binary.dot.tier,
            sparse = %table.sparse_f32.dot.tier,
            "resolved kernel dispatch"
        );
        table
    })
}

/// Selects the implementation of `op` for an explicit capability set.
///
/// `caps` is intersected with the detected capabilities first, so the result
/// is always safe to call on this CPU.
#[must_use]
pub fn select(op: Operation, caps: Capabilities) -> Selected<Kernel> {
    DispatchTable::resolve(caps, &DispatchConfig::default()).get(op)
}

/// Lists the tier the process-wide table selected for every operation.
#[must_use]
pub fn report() -> Vec<(Operation, Tier)> {
    let table = table();
    Operation::ALL
        .iter()
        .map(|&op| (op, table.tier_of(op)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_cached() {
        let first: *const DispatchTable = table();
        let second: *const DispatchTable = table();
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_covers_every_operation() {
        let report = report();
        assert_eq!(report.len(), Operation::ALL.len());
        let detected = detect();
        for (op, tier) in report {
            assert!(detected.contains(tier), "{op} selected undetected {tier}");
        }
    }

    #[test]
    fn test_select_baseline_is_scalar() {
        for op in Operation::ALL {
            assert_eq!(select(op, Capabilities::BASELINE).tier, Tier::Scalar, "{op}");
        }
    }

    #[test]
    fn test_select_never_exceeds_detection() {
        let everything = Capabilities::from_tiers(Tier::ALL);
        let detected = detect();
        for op in Operation::ALL {
            let tier = select(op, everything).tier;
            assert!(detected.contains(tier), "{op} selected undetected {tier}");
        }
    }
}

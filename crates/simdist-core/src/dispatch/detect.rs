//! Runtime CPU capability detection.
//!
//! Capabilities are probed once and cached in a process-wide atomic. The probe
//! is a pure function of the hardware, so threads racing through the first call
//! each compute and store the same value. No lock is taken and a stale read
//! simply probes again.
//!
//! # Tiers
//!
//! | Tier | Class | Architecture | Required features |
//! |------|-------|--------------|-------------------|
//! | [`Scalar`](Tier::Scalar) | baseline | any | none |
//! | [`V2`](Tier::V2) | mid-tier vector | x86-64 | SSE2..SSE4.2, POPCNT |
//! | [`Neon`](Tier::Neon) | mid-tier vector | aarch64 | NEON |
//! | [`V3`](Tier::V3) | wide vector | x86-64 | v2 + AVX, AVX2, BMI1/2, F16C, FMA, LZCNT |
//! | [`V4`](Tier::V4) | wide vector | x86-64 | v3 + AVX-512 F/BW/CD/DQ/VL |
//! | [`V4Vpopcntdq`](Tier::V4Vpopcntdq) | extension-gated wide | x86-64 | v4 + AVX512VPOPCNTDQ |
//! | [`Sve`](Tier::Sve) | scalable vector | aarch64 | NEON + SVE |
//! | [`V4Fp16`](Tier::V4Fp16) | half-precision native | x86-64 | v4 + AVX512FP16 |

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU16, Ordering};

use serde::{Deserialize, Serialize};
use simdist_common::Error;

/// An ordered CPU capability level gating which kernel implementation is eligible.
///
/// The derived ordering is the dispatch preference: when an operation has
/// implementations for several supported tiers, the greatest one wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Tier {
    /// Portable Rust, available everywhere.
    Scalar = 0,
    /// x86-64-v2: 128-bit SSE with hardware popcount.
    V2 = 1,
    /// aarch64 Advanced SIMD, 128-bit.
    Neon = 2,
    /// x86-64-v3: 256-bit AVX2 with FMA and F16C conversion.
    V3 = 3,
    /// x86-64-v4: 512-bit AVX-512 with mask registers.
    V4 = 4,
    /// x86-64-v4 plus the AVX-512 vector popcount extension.
    V4Vpopcntdq = 5,
    /// aarch64 Scalable Vector Extension.
    Sve = 6,
    /// x86-64-v4 plus native AVX-512 half-precision arithmetic.
    V4Fp16 = 7,
}

impl Tier {
    /// Every tier, in ascending preference order.
    pub const ALL: [Tier; 8] = [
        Tier::Scalar,
        Tier::V2,
        Tier::Neon,
        Tier::V3,
        Tier::V4,
        Tier::V4Vpopcntdq,
        Tier::Sve,
        Tier::V4Fp16,
    ];

    /// Returns the canonical name of the tier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::V2 => "v2",
            Self::Neon => "neon",
            Self::V3 => "v3",
            Self::V4 => "v4",
            Self::V4Vpopcntdq => "v4_avx512vpopcntdq",
            Self::Sve => "sve",
            Self::V4Fp16 => "v4_avx512fp16",
        }
    }

    /// Returns the capability class the tier belongs to.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Scalar => "baseline",
            Self::V2 | Self::Neon => "mid-tier vector",
            Self::V3 | Self::V4 => "wide vector",
            Self::V4Vpopcntdq => "extension-gated wide vector",
            Self::Sve => "scalable vector",
            Self::V4Fp16 => "half-precision native",
        }
    }

    /// Returns the target architecture the tier exists on, or `None` for the baseline.
    #[must_use]
    pub const fn arch(self) -> Option<&'static str> {
        match self {
            Self::Scalar => None,
            Self::Neon | Self::Sve => Some("aarch64"),
            Self::V2 | Self::V3 | Self::V4 | Self::V4Vpopcntdq | Self::V4Fp16 => Some("x86_64"),
        }
    }

    /// Returns the CPU features the tier requires, as `target_feature` names.
    #[must_use]
    pub const fn features(self) -> &'static [&'static str] {
        const V2: &[&str] = &["sse2", "sse3", "ssse3", "sse4.1", "sse4.2", "popcnt"];
        const V3: &[&str] = &[
            "sse2", "sse3", "ssse3", "sse4.1", "sse4.2", "popcnt", "avx", "avx2", "bmi1", "bmi2",
            "f16c", "fma", "lzcnt",
        ];
        const V4: &[&str] = &[
            "sse2", "sse3", "ssse3", "sse4.1", "sse4.2", "popcnt", "avx", "avx2", "bmi1", "bmi2",
            "f16c", "fma", "lzcnt", "avx512f", "avx512bw", "avx512cd", "avx512dq", "avx512vl",
        ];
        const V4_VPOPCNTDQ: &[&str] = &[
            "sse2", "sse3", "ssse3", "sse4.1", "sse4.2", "popcnt", "avx", "avx2", "bmi1", "bmi2",
            "f16c", "fma", "lzcnt", "avx512f", "avx512bw", "avx512cd", "avx512dq", "avx512vl",
            "avx512vpopcntdq",
        ];
        const V4_FP16: &[&str] = &[
            "sse2", "sse3", "ssse3", "sse4.1", "sse4.2", "popcnt", "avx", "avx2", "bmi1", "bmi2",
            "f16c", "fma", "lzcnt", "avx512f", "avx512bw", "avx512cd", "avx512dq", "avx512vl",
            "avx512fp16",
        ];
        match self {
            Self::Scalar => &[],
            Self::V2 => V2,
            Self::Neon => &["neon"],
            Self::V3 => V3,
            Self::V4 => V4,
            Self::V4Vpopcntdq => V4_VPOPCNTDQ,
            Self::Sve => &["neon", "sve"],
            Self::V4Fp16 => V4_FP16,
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = Error;

    /// Parses a tier name (case-insensitive). Accepts the canonical names
    /// plus the x86-64 microarchitecture level spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scalar" | "fallback" | "baseline" => Ok(Self::Scalar),
            "v2" | "x86-64-v2" => Ok(Self::V2),
            "neon" | "asimd" => Ok(Self::Neon),
            "v3" | "x86-64-v3" => Ok(Self::V3),
            "v4" | "x86-64-v4" => Ok(Self::V4),
            "v4_avx512vpopcntdq" | "avx512vpopcntdq" | "vpopcntdq" => Ok(Self::V4Vpopcntdq),
            "sve" => Ok(Self::Sve),
            "v4_avx512fp16" | "avx512fp16" | "fp16" => Ok(Self::V4Fp16),
            _ => Err(Error::UnknownTier(s.to_string())),
        }
    }
}

/// The set of tiers a CPU supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities(u16);

impl Capabilities {
    /// Only the scalar baseline.
    pub const BASELINE: Self = Self(Tier::Scalar.bit());

    /// Builds a capability set from tiers. The baseline is always included.
    #[must_use]
    pub fn from_tiers(tiers: impl IntoIterator<Item = Tier>) -> Self {
        tiers.into_iter().fold(Self::BASELINE, Self::with)
    }

    /// Returns true if `tier` is in the set.
    #[must_use]
    pub const fn contains(self, tier: Tier) -> bool {
        self.0 & tier.bit() != 0
    }

    /// Returns the set with `tier` added.
    #[must_use]
    pub const fn with(self, tier: Tier) -> Self {
        Self(self.0 | tier.bit())
    }

    /// Returns the set with `tier` removed. The baseline cannot be removed.
    #[must_use]
    pub const fn without(self, tier: Tier) -> Self {
        if matches!(tier, Tier::Scalar) {
            self
        } else {
            Self(self.0 & !tier.bit())
        }
    }

    /// Returns the tiers present in both sets.
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self((self.0 & other.0) | Tier::Scalar.bit())
    }

    /// Returns the most preferred tier in the set.
    #[must_use]
    pub fn best(self) -> Tier {
        self.iter().last().unwrap_or(Tier::Scalar)
    }

    /// Iterates the tiers in ascending preference order.
    pub fn iter(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |&t| self.contains(t))
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tier) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tier.name())?;
        }
        Ok(())
    }
}

// ============================================================================
// Detection
// ============================================================================

const INITIALIZED: u16 = 1 << 15;

static DETECTED: AtomicU16 = AtomicU16::new(0);

/// Returns the capabilities of the running CPU.
///
/// The first call probes the hardware; later calls read the cached value.
/// Concurrent first calls are benign: every caller stores the same bits.
#[must_use]
pub fn detect() -> Capabilities {
    let cached = DETECTED.load(Ordering::Relaxed);
    if cached & INITIALIZED != 0 {
        return Capabilities(cached & !INITIALIZED);
    }
    let caps = probe();
    DETECTED.store(caps.0 | INITIALIZED, Ordering::Relaxed);
    tracing::debug!(tiers = %caps, best = %caps.best(), "detected CPU capabilities");
    caps
}

#[cfg(target_arch = "x86_64")]
fn probe() -> Capabilities {
    use std::arch::is_x86_feature_detected as has;

    let mut caps = Capabilities::BASELINE;
    let v2 = has!("sse2")
        && has!("sse3")
        && has!("ssse3")
        && has!("sse4.1")
        && has!("sse4.2")
        && has!("popcnt");
    if !v2 {
        return caps;
    }
    caps = caps.with(Tier::V2);

    let v3 = has!("avx")
        && has!("avx2")
        && has!("bmi1")
        && has!("bmi2")
        && has!("f16c")
        && has!("fma")
        && has!("lzcnt");
    if !v3 {
        return caps;
    }
    caps = caps.with(Tier::V3);

    let v4 = has!("avx512f")
        && has!("avx512bw")
        && has!("avx512cd")
        && has!("avx512dq")
        && has!("avx512vl");
    if !v4 {
        return caps;
    }
    caps = caps.with(Tier::V4);

    if has!("avx512vpopcntdq") {
        caps = caps.with(Tier::V4Vpopcntdq);
    }
    if has!("avx512fp16") {
        caps = caps.with(Tier::V4Fp16);
    }
    caps
}

#[cfg(target_arch = "aarch64")]
fn probe() -> Capabilities {
    use std::arch::is_aarch64_feature_detected as has;

    let mut caps = Capabilities::BASELINE;
    if !has!("neon") {
        return caps;
    }
    caps = caps.with(Tier::Neon);
    if has!("sve") {
        caps = caps.with(Tier::Sve);
    }
    caps
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn probe() -> Capabilities {
    Capabilities::BASELINE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_matches_all() {
        let mut sorted = Tier::ALL;
        sorted.sort();
        assert_eq!(sorted, Tier::ALL);
    }

    #[test]
    fn test_tier_name_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(tier.name().parse::<Tier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_tier_aliases() {
        assert_eq!("X86-64-V3".parse::<Tier>().unwrap(), Tier::V3);
        assert_eq!("fallback".parse::<Tier>().unwrap(), Tier::Scalar);
        assert_eq!(" avx512fp16 ".parse::<Tier>().unwrap(), Tier::V4Fp16);
        assert!(matches!(
            "v5".parse::<Tier>(),
            Err(Error::UnknownTier(name)) if name == "v5"
        ));
    }

    #[test]
    fn test_tier_features_are_cumulative() {
        for f in Tier::V3.features() {
            assert!(Tier::V4.features().contains(f), "v4 is missing {f}");
        }
        for f in Tier::V2.features() {
            assert!(Tier::V3.features().contains(f), "v3 is missing {f}");
        }
        assert!(Tier::Scalar.features().is_empty());
    }

    #[test]
    fn test_capabilities_always_hold_baseline() {
        let caps = Capabilities::from_tiers([Tier::V3]).without(Tier::Scalar);
        assert!(caps.contains(Tier::Scalar));
        assert!(caps.contains(Tier::V3));
        assert!(!caps.contains(Tier::V4));
        assert_eq!(caps.best(), Tier::V3);
        assert_eq!(Capabilities::BASELINE.best(), Tier::Scalar);
    }

    #[test]
    fn test_capabilities_intersect() {
        let a = Capabilities::from_tiers([Tier::V2, Tier::V3, Tier::V4]);
        let b = Capabilities::from_tiers([Tier::V2, Tier::Neon]);
        let both = a.intersect(b);
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![Tier::Scalar, Tier::V2]);
    }

    #[test]
    fn test_capabilities_display() {
        let caps = Capabilities::from_tiers([Tier::V3, Tier::V2]);
        assert_eq!(caps.to_string(), "scalar, v2, v3");
    }

    #[test]
    fn test_detect_is_idempotent() {
        let first = detect();
        let second = detect();
        assert_eq!(first, second);
        assert!(first.contains(Tier::Scalar));
    }

    #[test]
    fn test_detect_is_race_tolerant() {
        let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(detect)).collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_detected_tiers_match_architecture() {
        for tier in detect().iter() {
            if let Some(arch) = tier.arch() {
                assert_eq!(arch, std::env::consts::ARCH, "{tier} detected on wrong arch");
            }
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_detected_tiers_are_nested() {
        let caps = detect();
        if caps.contains(Tier::V4) {
            assert!(caps.contains(Tier::V3));
        }
        if caps.contains(Tier::V3) {
            assert!(caps.contains(Tier::V2));
        }
        if caps.contains(Tier::V4Vpopcntdq) || caps.contains(Tier::V4Fp16) {
            assert!(caps.contains(Tier::V4));
        }
    }
}

//! Dispatch configuration.
//!
//! By default every detected tier is eligible. A configuration can cap the
//! selectable tier or exclude individual tiers, which is useful for comparing
//! implementations and for working around a misbehaving instruction set.
//!
//! The process-wide dispatch table reads its configuration from the
//! environment on first use:
//!
//! | Variable | Example | Effect |
//! |----------|---------|--------|
//! | `SIMDIST_MAX_TIER` | `v3` | never select a tier above `v3` on its architecture |
//! | `SIMDIST_DISABLE` | `v4_avx512vpopcntdq,sve` | never select the listed tiers |

use simdist_common::utils::error::ConfigError;

use crate::dispatch::{Capabilities, Tier};

/// Environment variable capping the selectable tier.
pub const ENV_MAX_TIER: &str = "SIMDIST_MAX_TIER";

/// Environment variable listing tiers to exclude, comma separated.
pub const ENV_DISABLE: &str = "SIMDIST_DISABLE";

/// Which tiers dispatch may select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Highest tier that may be selected (None for no cap).
    ///
    /// The cap only orders tiers of its own architecture: `v3` leaves the
    /// aarch64 tiers alone, while `scalar` excludes everything.
    pub max_tier: Option<Tier>,

    /// Tiers that must never be selected.
    pub disabled: Vec<Tier>,
}

impl DispatchConfig {
    /// Creates a configuration that allows every detected tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that only allows the scalar baseline.
    #[must_use]
    pub fn scalar_only() -> Self {
        Self::new().with_max_tier(Tier::Scalar)
    }

    /// Caps the selectable tier.
    #[must_use]
    pub fn with_max_tier(mut self, tier: Tier) -> Self {
        self.max_tier = Some(tier);
        self
    }

    /// Excludes a tier from selection.
    #[must_use]
    pub fn without_tier(mut self, tier: Tier) -> Self {
        if !self.disabled.contains(&tier) {
            self.disabled.push(tier);
        }
        self
    }

    /// Reads the configuration from `SIMDIST_MAX_TIER` and `SIMDIST_DISABLE`.
    ///
    /// Unparseable values are logged and ignored so a typo in the environment
    /// never prevents dispatch from resolving.
    #[must_use]
    pub fn from_env() -> Self {
        let max_tier = std::env::var(ENV_MAX_TIER).ok();
        let disabled = std::env::var(ENV_DISABLE).ok();
        match Self::parse(max_tier.as_deref(), disabled.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring dispatch environment: {e}");
                Self::default()
            }
        }
    }

    /// Builds a configuration from raw variable values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a tier name does not parse.
    pub fn parse(max_tier: Option<&str>, disabled: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = max_tier.map(str::trim).filter(|s| !s.is_empty()) {
            let tier = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_MAX_TIER,
                value: raw.to_string(),
            })?;
            config = config.with_max_tier(tier);
        }
        if let Some(raw) = disabled {
            for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let tier = name.parse().map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_DISABLE,
                    value: name.to_string(),
                })?;
                config = config.without_tier(tier);
            }
        }
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ScalarDisabled`] if the baseline is excluded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.disabled.contains(&Tier::Scalar) {
            return Err(ConfigError::ScalarDisabled);
        }
        Ok(())
    }

    /// Returns true if `tier` may be selected.
    #[must_use]
    pub fn allows(&self, tier: Tier) -> bool {
        if tier == Tier::Scalar {
            return true;
        }
        let capped = self.max_tier.is_some_and(|max| {
            (max.arch().is_none() || max.arch() == tier.arch()) && tier > max
        });
        !capped && !self.disabled.contains(&tier)
    }

    /// Removes the tiers this configuration forbids from `caps`.
    #[must_use]
    pub fn restrict(&self, caps: Capabilities) -> Capabilities {
        caps.iter()
            .filter(|&t| !self.allows(t))
            .fold(caps, Capabilities::without)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_allows_everything() {
        let config = DispatchConfig::default();
        assert!(config.max_tier.is_none());
        assert!(config.disabled.is_empty());
        for tier in Tier::ALL {
            assert!(config.allows(tier));
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_max_tier() {
        let config = DispatchConfig::new().with_max_tier(Tier::V3);
        assert!(config.allows(Tier::V2));
        assert!(config.allows(Tier::V3));
        assert!(!config.allows(Tier::V4));
        assert!(!config.allows(Tier::V4Vpopcntdq));
    }

    #[test]
    fn test_config_max_tier_ignores_other_architectures() {
        let config = DispatchConfig::new().with_max_tier(Tier::V4);
        assert!(config.allows(Tier::Sve));
        assert!(config.allows(Tier::Neon));
        assert!(!config.allows(Tier::V4Fp16));

        let config = DispatchConfig::new().with_max_tier(Tier::Neon);
        assert!(!config.allows(Tier::Sve));
        assert!(config.allows(Tier::V4Vpopcntdq));

        let config = DispatchConfig::scalar_only();
        assert!(!config.allows(Tier::Neon));
        assert!(!config.allows(Tier::V2));
    }

    #[test]
    fn test_config_without_tier_is_deduplicated() {
        let config = DispatchConfig::new()
            .without_tier(Tier::V4)
            .without_tier(Tier::V4);
        assert_eq!(config.disabled, vec![Tier::V4]);
        assert!(!config.allows(Tier::V4));
        assert!(config.allows(Tier::V4Vpopcntdq));
    }

    #[test]
    fn test_config_scalar_is_always_allowed() {
        let config = DispatchConfig::new().without_tier(Tier::Scalar);
        assert!(config.allows(Tier::Scalar));
        assert_eq!(config.validate(), Err(ConfigError::ScalarDisabled));
    }

    #[test]
    fn test_config_scalar_only() {
        let config = DispatchConfig::scalar_only();
        let caps = Capabilities::from_tiers(Tier::ALL);
        assert_eq!(config.restrict(caps), Capabilities::BASELINE);
    }

    #[test]
    fn test_config_restrict() {
        let caps = Capabilities::from_tiers([Tier::V2, Tier::V3, Tier::V4, Tier::V4Vpopcntdq]);
        let config = DispatchConfig::new()
            .with_max_tier(Tier::V4Vpopcntdq)
            .without_tier(Tier::V3);
        let restricted = config.restrict(caps);
        assert_eq!(
            restricted.iter().collect::<Vec<_>>(),
            vec![Tier::Scalar, Tier::V2, Tier::V4, Tier::V4Vpopcntdq]
        );
    }

    #[test]
    fn test_config_parse() {
        let config = DispatchConfig::parse(Some(" v3 "), Some("v2, ,neon")).unwrap();
        assert_eq!(config.max_tier, Some(Tier::V3));
        assert_eq!(config.disabled, vec![Tier::V2, Tier::Neon]);
    }

    #[test]
    fn test_config_parse_empty() {
        let config = DispatchConfig::parse(Some(""), None).unwrap();
        assert_eq!(config, DispatchConfig::default());
    }

    #[test]
    fn test_config_parse_rejects_unknown() {
        let err = DispatchConfig::parse(None, Some("v2,avx9000")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                name: ENV_DISABLE,
                value: "avx9000".to_string()
            }
        );
    }
}

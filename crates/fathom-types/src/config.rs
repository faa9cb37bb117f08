//! Per-epoch aggregation configuration.
//!
//! Configuration is mutable only between epochs: the oracle captures a
//! copy of the active configuration into each epoch when the epoch is
//! initialized for reveal, so a mid-epoch change can never affect an
//! epoch that has already pinned its snapshot.

use serde::{Deserialize, Serialize};

use crate::{VoterId, BIPS, PPM};

/// Error types for schedule and configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A window period of zero length was supplied.
    #[error("epoch periods must be positive")]
    ZeroPeriod,

    /// A vote-power cap divisor of zero was supplied.
    #[error("vote power cap divisors must be positive")]
    ZeroCapDivisor,

    /// A basis-point share or threshold exceeds the full unit.
    #[error("{name} of {value} exceeds {max}")]
    ValueOutOfRange {
        /// Name of the offending parameter.
        name: &'static str,
        /// Supplied value.
        value: u128,
        /// Maximum allowed value.
        max: u128,
    },

    /// The low asset-USD threshold exceeds the high threshold.
    #[error("low asset USD threshold {low} exceeds high threshold {high}")]
    InvertedUsdThresholds {
        /// Configured low threshold.
        low: u128,
        /// Configured high threshold.
        high: u128,
    },
}

/// Aggregation parameters captured per epoch at initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochConfig {
    /// Minimum raw native vote power; a voter below this floor *and*
    /// the asset floor cannot vote.
    pub min_native_power: u64,
    /// Minimum asset vote power (USD-normalized), see above.
    pub min_asset_power: u64,
    /// A voter's counted native power is capped at `total / divisor`.
    pub native_cap_divisor: u64,
    /// A voter's counted asset power is capped at `total / divisor`.
    pub asset_cap_divisor: u64,
    /// Asset USD value below which weights are all-native, in micro-USD.
    pub low_asset_usd_threshold: u128,
    /// Asset USD value at or above which weights are all-asset.
    pub high_asset_usd_threshold: u128,
    /// Share of the reward weight assigned to the elastic band, in BIPS;
    /// the IQR band receives the complement.
    pub elastic_share_bips: u128,
    /// Elastic band half-width as a fraction of the median, in PPM.
    /// A zero half-width makes the elastic band empty.
    pub elastic_half_width_ppm: u128,
    /// Accounts whose reveals back the trusted-median fallback path.
    pub trusted_providers: Vec<VoterId>,
    /// Relative deviation (BIPS) beyond which the population median and
    /// the trusted median are considered irreconcilable.
    pub max_deviation_bips: u128,
    /// Minimum combined-weight turnout (BIPS of total power) for the
    /// normal weighted-median path.
    pub low_turnout_bips: u128,
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            min_native_power: 0,
            min_asset_power: 0,
            native_cap_divisor: 20,
            asset_cap_divisor: 20,
            low_asset_usd_threshold: 1_000 * 1_000_000,
            high_asset_usd_threshold: 10_000 * 1_000_000,
            elastic_share_bips: 0,
            elastic_half_width_ppm: 0,
            trusted_providers: Vec::new(),
            max_deviation_bips: 500,
            low_turnout_bips: 1_500,
        }
    }
}

impl EpochConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroCapDivisor`] if either cap divisor is zero
    /// - [`ConfigError::ValueOutOfRange`] if a BIPS share or threshold
    ///   exceeds [`BIPS`], or the elastic half-width exceeds [`PPM`]
    /// - [`ConfigError::InvertedUsdThresholds`] if `low > high`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.native_cap_divisor == 0 || self.asset_cap_divisor == 0 {
            return Err(ConfigError::ZeroCapDivisor);
        }
        if self.elastic_share_bips > BIPS {
            return Err(ConfigError::ValueOutOfRange {
                name: "elastic band share",
                value: self.elastic_share_bips,
                max: BIPS,
            });
        }
        if self.elastic_half_width_ppm > PPM {
            return Err(ConfigError::ValueOutOfRange {
                name: "elastic band half-width",
                value: self.elastic_half_width_ppm,
                max: PPM,
            });
        }
        if self.max_deviation_bips > BIPS {
            return Err(ConfigError::ValueOutOfRange {
                name: "price deviation threshold",
                value: self.max_deviation_bips,
                max: BIPS,
            });
        }
        if self.low_turnout_bips > BIPS {
            return Err(ConfigError::ValueOutOfRange {
                name: "turnout threshold",
                value: self.low_turnout_bips,
                max: BIPS,
            });
        }
        if self.low_asset_usd_threshold > self.high_asset_usd_threshold {
            return Err(ConfigError::InvertedUsdThresholds {
                low: self.low_asset_usd_threshold,
                high: self.high_asset_usd_threshold,
            });
        }
        Ok(())
    }

    /// Whether `voter` is a configured trusted provider.
    pub fn is_trusted(&self, voter: &VoterId) -> bool {
        self.trusted_providers.contains(voter)
    }
}

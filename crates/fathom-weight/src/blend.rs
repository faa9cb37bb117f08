//! Native/asset weight blending.
//!
//! Each voter's capped, TERA-normalized native and asset fractions are
//! combined into one weight by a mixing ratio derived from the asset's
//! total USD value:
//!
//! ```text
//! ratio = 0                         value <  low threshold
//! ratio = BIPS                      value >= high threshold
//! ratio = BIPS * (value - low)
//!              / (high - low)       otherwise
//!
//! combined = native * (BIPS - ratio) / BIPS + asset * ratio / BIPS
//! ```
//!
//! The separate native-only weight feeds reward-pool accounting and is
//! never affected by the blend. Weights are computed exactly once, at
//! reveal time, from the epoch's pinned snapshot.

use serde::{Deserialize, Serialize};

use fathom_types::{config::EpochConfig, BIPS};

use crate::power::{cap_power, normalize_power};
use crate::{Result, WeightError};

/// A voter's derived weights, in TERA parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterWeights {
    /// Blended native/asset weight used for aggregation.
    pub combined: u128,
    /// Capped, normalized native fraction alone, used for rewards.
    pub native_only: u128,
}

/// Mixing ratio in BIPS: the asset share of the blended weight.
pub fn mix_ratio_bips(asset_usd_value: u128, low: u128, high: u128) -> u128 {
    if asset_usd_value < low {
        0
    } else if asset_usd_value >= high {
        BIPS
    } else {
        BIPS * (asset_usd_value - low) / (high - low)
    }
}

/// Computes per-voter weights from raw snapshot vote power.
///
/// Constructed from the configuration captured by the epoch, so the
/// thresholds in force can never drift under an initialized epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightBlender {
    min_native_power: u64,
    min_asset_power: u64,
    native_cap_divisor: u64,
    asset_cap_divisor: u64,
    low_asset_usd_threshold: u128,
    high_asset_usd_threshold: u128,
}

impl WeightBlender {
    /// Build a blender from an epoch's captured configuration.
    pub fn from_config(config: &EpochConfig) -> Self {
        Self {
            min_native_power: config.min_native_power,
            min_asset_power: config.min_asset_power,
            native_cap_divisor: config.native_cap_divisor,
            asset_cap_divisor: config.asset_cap_divisor,
            low_asset_usd_threshold: config.low_asset_usd_threshold,
            high_asset_usd_threshold: config.high_asset_usd_threshold,
        }
    }

    /// Derive a voter's combined and native-only weights.
    ///
    /// `asset_raw` and `asset_total` are USD-normalized asset powers at
    /// the epoch's snapshot; `has_asset` is false for an instance with
    /// no asset configured, which always blends all-native.
    ///
    /// # Errors
    ///
    /// - [`WeightError::BelowPowerFloor`] if the voter is below both
    ///   class floors
    pub fn weigh(
        &self,
        native_raw: u64,
        asset_raw: u64,
        native_total: u64,
        asset_total: u64,
        has_asset: bool,
    ) -> Result<VoterWeights> {
        let below_native = self.min_native_power > 0 && native_raw < self.min_native_power;
        let below_asset = self.min_asset_power > 0 && asset_raw < self.min_asset_power;
        if below_native && below_asset {
            return Err(WeightError::BelowPowerFloor {
                native: native_raw,
                asset: asset_raw,
            });
        }

        let native_capped = cap_power(native_raw, native_total, self.native_cap_divisor);
        let asset_capped = cap_power(asset_raw, asset_total, self.asset_cap_divisor);

        let native_weight = normalize_power(native_capped, native_total);
        let asset_weight = normalize_power(asset_capped, asset_total);

        let ratio = if has_asset {
            mix_ratio_bips(
                u128::from(asset_total),
                self.low_asset_usd_threshold,
                self.high_asset_usd_threshold,
            )
        } else {
            0
        };

        let combined = native_weight * (BIPS - ratio) / BIPS + asset_weight * ratio / BIPS;

        tracing::trace!(
            native_weight,
            asset_weight,
            ratio,
            combined,
            "blended voter weight"
        );

        Ok(VoterWeights {
            combined,
            native_only: native_weight,
        })
    }
}

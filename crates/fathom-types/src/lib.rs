//! # fathom-types
//!
//! Shared identifiers, fixed-point constants, the epoch schedule, and
//! epoch configuration for the Fathom price oracle.
//!
//! All weights in the system are normalized into parts per trillion
//! ([`TERA`]) of their class total; shares and thresholds are expressed
//! in basis points ([`BIPS`]); the elastic reward band half-width is
//! expressed in parts per million ([`PPM`]).
//!
//! ## Modules
//!
//! - [`schedule`] — epoch timing derived from wall-clock time
//! - [`config`] — per-epoch aggregation configuration

pub mod config;
pub mod schedule;

/// 32-byte opaque account identifier of a voter.
pub type VoterId = [u8; 32];

/// Historical chain/state position at which vote power is frozen.
pub type SnapshotId = u64;

/// Fixed-point unit for normalized vote weights: parts per trillion.
pub const TERA: u128 = 1_000_000_000_000;

/// Basis points: fixed-point unit for shares, thresholds, and turnout.
pub const BIPS: u128 = 10_000;

/// Parts per million: fixed-point unit for the elastic band half-width.
pub const PPM: u128 = 1_000_000;

/// Maximum accepted revealed price, in micro-USD.
pub const MAX_PRICE: u128 = 1 << 56;

/// Convert a TERA-normalized weight sum into basis points of the unit.
pub fn tera_to_bips(weight: u128) -> u128 {
    weight / (TERA / BIPS)
}

/// Which decision-ladder path produced a finalized epoch's outcome.
///
/// The kind is retained on the outcome so downstream reward accounting
/// can tell whether any weight-based reward is owed for the epoch:
/// only [`FinalizationKind::WeightedMedian`] carries rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizationKind {
    /// Normal outcome: weighted median over all valid reveals.
    WeightedMedian,
    /// Degraded outcome: median of the trusted providers' reveals.
    TrustedMedian,
    /// Degraded outcome: previous epoch's price carried forward.
    CarriedForward,
    /// Forced outcome: unweighted average of whatever reveals exist.
    ForcedAverage,
    /// Forced outcome: previous epoch's price carried forward.
    ForcedCarriedForward,
}

impl FinalizationKind {
    /// Whether this outcome kind owes weight-based rewards.
    pub fn is_rewarded(&self) -> bool {
        matches!(self, FinalizationKind::WeightedMedian)
    }
}

//! # fathom-weight
//!
//! Snapshot-based vote-power weighting for the Fathom price oracle.
//!
//! A voter's influence is derived from frozen historical holdings in two
//! independent classes — a native quantity and an asset quantity — each
//! capped, normalized into [`fathom_types::TERA`] parts of its class
//! total, and blended into one combined weight by where the asset's
//! current USD value falls between two configured thresholds.
//!
//! All inputs are read-only point queries against an immutable snapshot;
//! nothing here ever reads live balances.
//!
//! ## Modules
//!
//! - [`power`] — the [`power::VotePowerSource`] query interface, capping,
//!   and normalization
//! - [`blend`] — the native/asset weight blender
//! - [`composite`] — synthetic asset power for multi-asset instances

pub mod blend;
pub mod composite;
pub mod power;

/// Error types for weight computation.
#[derive(Debug, thiserror::Error)]
pub enum WeightError {
    /// Raw vote power is below both class floors; the voter cannot vote.
    #[error("vote power below both class floors: native {native}, asset {asset}")]
    BelowPowerFloor {
        /// Raw native power at the snapshot.
        native: u64,
        /// USD-normalized asset power at the snapshot.
        asset: u64,
    },
}

/// Convenience result type for weight computation.
pub type Result<T> = std::result::Result<T, WeightError>;

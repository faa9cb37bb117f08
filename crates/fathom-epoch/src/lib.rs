//! # fathom-epoch
//!
//! The epoch state machine of the Fathom price oracle: the commit-reveal
//! ledger, the bounded ring-buffer epoch store, the fallback decision
//! ladder, and the [`oracle::PriceOracle`] facade that ties them
//! together.
//!
//! An epoch moves through a fixed lifecycle driven by wall-clock windows
//! and three manager actions:
//!
//! ```text
//! Created -> Submitting -> RevealInitialized -> Revealing -> Finalized
//! ```
//!
//! Voters commit a hash during the submit window, the manager pins the
//! vote-power snapshot before reveals open, voters reveal during the
//! reveal window, and the manager finalizes once the reveal window has
//! passed. Every operation takes an explicit `now` parameter; nothing
//! here reads an ambient clock.
//!
//! ## Modules
//!
//! - [`commit`] — the domain-separated price commitment hash
//! - [`vote`] — revealed votes and the per-epoch reward set
//! - [`epoch`] — the per-epoch record and its lifecycle bookkeeping
//! - [`store`] — the fixed-capacity ring buffer of epoch records
//! - [`fallback`] — the finalization decision ladder
//! - [`oracle`] — the manager/voter/consumer facade

pub mod commit;
pub mod epoch;
pub mod fallback;
pub mod oracle;
pub mod store;
pub mod vote;

use fathom_types::config::ConfigError;
use fathom_weight::WeightError;

/// Error types for epoch state transitions and queries.
#[derive(Debug, thiserror::Error)]
pub enum EpochError {
    /// A manager-only action was invoked by a non-manager identity.
    #[error("caller is not the managing account")]
    AccessDenied,

    /// An action was attempted outside its valid phase or time window.
    #[error("epoch {epoch_id} does not accept this action at time {now}")]
    WindowViolation {
        /// Epoch the action targeted.
        epoch_id: u64,
        /// Wall-clock time of the attempt.
        now: u64,
    },

    /// A reveal was attempted before the epoch was initialized for
    /// reveal, or by a non-trusted voter while the epoch is in fallback
    /// mode.
    #[error("epoch {epoch_id} is not initialized for reveal")]
    NotInitialized {
        /// Epoch the reveal targeted.
        epoch_id: u64,
    },

    /// The voter already holds a commitment or a revealed vote in this
    /// epoch.
    #[error("duplicate submission for epoch {epoch_id}")]
    DuplicateSubmission {
        /// Epoch the submission targeted.
        epoch_id: u64,
    },

    /// The revealed price and nonce do not hash to the committed value,
    /// or no commitment exists for the voter.
    #[error("reveal does not match the committed hash")]
    RevealMismatch,

    /// The revealed price exceeds the maximum accepted magnitude.
    #[error("price {price} exceeds the maximum accepted price")]
    PriceOutOfRange {
        /// The rejected price.
        price: u128,
    },

    /// The epoch is already finalized; its outcome is immutable.
    #[error("epoch {epoch_id} is already finalized")]
    AlreadyFinalized {
        /// The finalized epoch.
        epoch_id: u64,
    },

    /// The epoch's slot has been overwritten by a newer epoch.
    #[error("epoch {epoch_id} was evicted from the bounded store")]
    DataEvicted {
        /// The evicted epoch.
        epoch_id: u64,
    },

    /// The epoch lies in the future or has not produced the requested
    /// data yet.
    #[error("epoch {epoch_id} is not yet available")]
    NotYetAvailable {
        /// The requested epoch.
        epoch_id: u64,
    },

    /// The supplied snapshot does not lie strictly before the current
    /// chain/state position.
    #[error("snapshot {snapshot} is not strictly before position {position}")]
    SnapshotInFuture {
        /// The rejected snapshot identifier.
        snapshot: u64,
        /// The chain/state position current at call time.
        position: u64,
    },

    /// Configuration validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Weight computation rejected the voter.
    #[error(transparent)]
    Weight(#[from] WeightError),
}

/// Convenience result type for epoch operations.
pub type Result<T> = std::result::Result<T, EpochError>;

//! Per-epoch record and lifecycle bookkeeping.
//!
//! An epoch is created implicitly when first touched, initialized for
//! reveal exactly once (pinning the snapshot, power totals, fallback
//! flag, and the configuration in force), and finalized exactly once.
//! After finalization the record is immutable until the ring buffer
//! evicts it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use fathom_types::{config::EpochConfig, FinalizationKind, SnapshotId, VoterId};
use fathom_weight::composite::CompositeValuation;

use crate::commit::CommitmentHash;
use crate::vote::{RewardSet, Vote};
use crate::{EpochError, Result};

/// Reveal-phase state pinned at initialization.
///
/// Everything reveals depend on is captured here so that neither a
/// configuration change nor a later snapshot can affect an epoch that
/// has already opened for reveal.
#[derive(Clone, Debug)]
pub struct RevealInit {
    /// Frozen historical position vote power is read at.
    pub snapshot: SnapshotId,
    /// Total native power at the snapshot.
    pub native_total: u64,
    /// Total asset power at the snapshot, USD-normalized.
    pub asset_total: u64,
    /// Asset reference price used to USD-normalize direct asset power.
    pub asset_ref_price: u128,
    /// Whether this instance carries an asset class at all.
    pub has_asset: bool,
    /// Degraded-turnout flag: set by the manager or automatically when
    /// the snapshot's native total power is zero.
    pub fallback_mode: bool,
    /// Configuration in force for this epoch.
    pub config: EpochConfig,
    /// Pinned child valuation for composite instances.
    pub valuation: Option<CompositeValuation>,
}

/// A finalized epoch's immutable outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochOutcome {
    /// The aggregate price in micro-USD.
    pub price: u128,
    /// Lower bound of the IQR reward band.
    pub iqr_low: u128,
    /// Upper bound of the IQR reward band.
    pub iqr_high: u128,
    /// Lower bound of the elastic reward band.
    pub elastic_low: u128,
    /// Upper bound of the elastic reward band.
    pub elastic_high: u128,
    /// Which decision-ladder path produced the outcome.
    pub kind: FinalizationKind,
    /// Wall-clock time of finalization.
    pub finalized_at: u64,
}

/// One epoch's full state.
#[derive(Clone, Debug, Default)]
pub struct Epoch {
    id: u64,
    commits: HashMap<VoterId, CommitmentHash>,
    reveal: Option<RevealInit>,
    votes: Vec<Vote>,
    outcome: Option<EpochOutcome>,
    rewards: Option<RewardSet>,
}

impl Epoch {
    /// Create an empty epoch record.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// The epoch's identity.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the epoch has been initialized for reveal.
    pub fn is_initialized(&self) -> bool {
        self.reveal.is_some()
    }

    /// Whether the epoch has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    /// The pinned reveal-phase state, if initialized.
    pub fn reveal_init(&self) -> Option<&RevealInit> {
        self.reveal.as_ref()
    }

    /// The finalized outcome, if any.
    pub fn outcome(&self) -> Option<&EpochOutcome> {
        self.outcome.as_ref()
    }

    /// The reward set, if finalized.
    pub fn rewards(&self) -> Option<&RewardSet> {
        self.rewards.as_ref()
    }

    /// All revealed votes, in reveal order.
    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// The price `voter` revealed in this epoch, if any.
    pub fn voter_price(&self, voter: &VoterId) -> Option<u128> {
        self.votes.iter().find(|v| &v.voter == voter).map(|v| v.price)
    }

    /// The commitment `voter` submitted, if any.
    pub fn commitment(&self, voter: &VoterId) -> Option<CommitmentHash> {
        self.commits.get(voter).copied()
    }

    /// Record a commitment hash for `voter`.
    ///
    /// # Errors
    ///
    /// - [`EpochError::DuplicateSubmission`] if the voter already holds
    ///   a commitment in this epoch
    pub(crate) fn record_commit(&mut self, voter: VoterId, hash: CommitmentHash) -> Result<()> {
        if self.commits.contains_key(&voter) {
            return Err(EpochError::DuplicateSubmission { epoch_id: self.id });
        }
        self.commits.insert(voter, hash);
        Ok(())
    }

    /// Pin the reveal-phase state. One-shot per epoch.
    ///
    /// # Errors
    ///
    /// - [`EpochError::WindowViolation`] if already initialized
    pub(crate) fn initialize(&mut self, init: RevealInit, now: u64) -> Result<()> {
        if self.reveal.is_some() {
            return Err(EpochError::WindowViolation {
                epoch_id: self.id,
                now,
            });
        }
        self.reveal = Some(init);
        Ok(())
    }

    /// Record a revealed vote.
    ///
    /// # Errors
    ///
    /// - [`EpochError::DuplicateSubmission`] if the voter already
    ///   revealed in this epoch
    pub(crate) fn record_vote(&mut self, vote: Vote) -> Result<()> {
        if self.votes.iter().any(|v| v.voter == vote.voter) {
            return Err(EpochError::DuplicateSubmission { epoch_id: self.id });
        }
        self.votes.push(vote);
        Ok(())
    }

    /// Record the finalization outcome and reward set. One-shot.
    ///
    /// # Errors
    ///
    /// - [`EpochError::AlreadyFinalized`] on a second finalization
    pub(crate) fn finalize(&mut self, outcome: EpochOutcome, rewards: RewardSet) -> Result<()> {
        if self.outcome.is_some() {
            return Err(EpochError::AlreadyFinalized { epoch_id: self.id });
        }
        self.outcome = Some(outcome);
        self.rewards = Some(rewards);
        Ok(())
    }
}

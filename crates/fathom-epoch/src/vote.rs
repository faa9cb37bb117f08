//! Revealed votes and the per-epoch reward set.

use serde::{Deserialize, Serialize};

use fathom_types::{FinalizationKind, VoterId};

/// A single revealed vote.
///
/// Weight fields are computed exactly once, at reveal time, from the
/// epoch's pinned snapshot; finalization never recomputes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Revealing account.
    pub voter: VoterId,
    /// Revealed price in micro-USD.
    pub price: u128,
    /// Blended combined weight in TERA parts, used for aggregation.
    pub weight: u128,
    /// Native-only weight in TERA parts, used for reward accounting.
    pub native_weight: u128,
}

/// The reward interface of a finalized epoch: eligible voters, their
/// band-scaled native weights, and the weight sum, tagged with the
/// finalization kind so downstream accounting can tell whether any
/// weight-based reward is owed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSet {
    /// Reward-eligible voters, in reveal order.
    pub voters: Vec<VoterId>,
    /// Each eligible voter's native weight scaled by its band shares.
    pub weights: Vec<u128>,
    /// Sum of the scaled weights.
    pub weight_sum: u128,
    /// Which decision-ladder path finalized the epoch.
    pub kind: FinalizationKind,
}

impl RewardSet {
    /// An empty reward set for a degraded or forced outcome.
    pub fn empty(kind: FinalizationKind) -> Self {
        Self {
            voters: Vec::new(),
            weights: Vec::new(),
            weight_sum: 0,
            kind,
        }
    }
}

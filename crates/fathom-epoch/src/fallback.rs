//! Finalization decision ladder.
//!
//! Executed once per epoch at finalization time, in order:
//!
//! 1. Turnout adequate and fallback mode not set: weighted median over
//!    all positive-weight votes, with reward bands.
//! 2. Turnout inadequate or fallback mode set: median of the trusted
//!    providers' reveals, if any. When only the fallback flag is set
//!    and the population median agrees with the trusted median within
//!    the deviation threshold, the population result stands; otherwise
//!    the trusted median wins with an empty reward set.
//! 3. No trusted reveals: the previous price is carried forward with an
//!    empty reward set. The epoch still finalizes so the schedule never
//!    stalls.
//!
//! Low turnout and missing data are expected outcomes here, never
//! errors; the ladder always produces a price.

use fathom_median::band::{elastic_band, reward_eligibility};
use fathom_median::simple::simple_median;
use fathom_median::weighted::{compute_weighted, WeightedMedianData};
use fathom_types::{config::EpochConfig, tera_to_bips, FinalizationKind, BIPS};

use crate::vote::{RewardSet, Vote};

/// The ladder's verdict: price, reward bands, kind, and reward set.
#[derive(Clone, Debug)]
pub struct Decision {
    /// The aggregate price.
    pub price: u128,
    /// IQR band bounds; collapsed to the price on degraded paths.
    pub iqr: (u128, u128),
    /// Elastic band bounds; collapsed to the price on degraded paths
    /// and when the configured half-width is zero.
    pub elastic: (u128, u128),
    /// Which ladder path produced the price.
    pub kind: FinalizationKind,
    /// Reward-eligible voters; empty on degraded paths.
    pub rewards: RewardSet,
}

impl Decision {
    fn degraded(price: u128, kind: FinalizationKind) -> Self {
        Self {
            price,
            iqr: (price, price),
            elastic: (price, price),
            kind,
            rewards: RewardSet::empty(kind),
        }
    }
}

/// Whether the population and trusted medians are irreconcilable:
/// `|median - trusted| / trusted > max_deviation_bips / BIPS`.
fn deviates(median: u128, trusted: u128, max_deviation_bips: u128) -> bool {
    median.abs_diff(trusted) * BIPS > max_deviation_bips * trusted
}

fn normal(data: &WeightedMedianData, votes: &[Vote], config: &EpochConfig) -> Decision {
    let median = data.median_price;
    let elastic = elastic_band(median, config.elastic_half_width_ppm);

    let native: Vec<(u128, u128)> = votes.iter().map(|v| (v.price, v.native_weight)).collect();
    let (eligibility, weight_sum) = reward_eligibility(
        &native,
        (data.quartile1_price, data.quartile3_price),
        elastic,
        config.elastic_share_bips,
    );

    let mut voters = Vec::new();
    let mut weights = Vec::new();
    for (vote, entry) in votes.iter().zip(&eligibility) {
        if entry.reward_weight > 0 {
            voters.push(vote.voter);
            weights.push(entry.reward_weight);
        }
    }

    Decision {
        price: median,
        iqr: (data.quartile1_price, data.quartile3_price),
        elastic: elastic.unwrap_or((median, median)),
        kind: FinalizationKind::WeightedMedian,
        rewards: RewardSet {
            voters,
            weights,
            weight_sum,
            kind: FinalizationKind::WeightedMedian,
        },
    }
}

/// Run the automatic decision ladder.
///
/// `previous_price` is carried forward when no usable data exists.
pub fn decide(
    votes: &[Vote],
    config: &EpochConfig,
    fallback_mode: bool,
    previous_price: u128,
) -> Decision {
    let turnout_bips = tera_to_bips(votes.iter().map(|v| v.weight).sum());
    let turnout_ok = turnout_bips >= config.low_turnout_bips;

    let pairs: Vec<(u128, u128)> = votes.iter().map(|v| (v.price, v.weight)).collect();
    let weighted = compute_weighted(&pairs).ok();

    if let Some(data) = &weighted {
        if turnout_ok && !fallback_mode {
            return normal(data, votes, config);
        }
    }

    let trusted_prices: Vec<u128> = votes
        .iter()
        .filter(|v| config.is_trusted(&v.voter))
        .map(|v| v.price)
        .collect();

    if let Ok(trusted) = simple_median(&trusted_prices) {
        if let Some(data) = &weighted {
            // Fallback flag alone does not discard an adequate-turnout
            // result the trusted providers agree with.
            if turnout_ok && !deviates(data.median_price, trusted, config.max_deviation_bips) {
                return normal(data, votes, config);
            }
        }
        tracing::warn!(
            trusted,
            turnout_bips,
            fallback_mode,
            "finalizing on trusted-provider median"
        );
        return Decision::degraded(trusted, FinalizationKind::TrustedMedian);
    }

    tracing::warn!(
        turnout_bips,
        fallback_mode,
        previous_price,
        "no usable data, carrying price forward"
    );
    Decision::degraded(previous_price, FinalizationKind::CarriedForward)
}

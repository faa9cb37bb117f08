//! Elastic band and reward eligibility.
//!
//! Reward-eligible voters are the union of two bands around the
//! aggregate price:
//!
//! - the IQR band `[quartile1, quartile3]`, carrying
//!   `BIPS - elastic_share` of the reward weight, and
//! - the elastic band `median * (1 ± half_width)`, carrying
//!   `elastic_share`.
//!
//! A voter inside both bands accumulates both contributions. Reward
//! contributions are scaled from the voter's native-only weight, never
//! the blended weight.

use serde::{Deserialize, Serialize};

use fathom_types::{BIPS, PPM};

/// Elastic band bounds around `median`, inclusive on both ends.
///
/// Returns `None` for a zero half-width: a width-zero band contains
/// nobody, not even exact-median votes.
pub fn elastic_band(median: u128, half_width_ppm: u128) -> Option<(u128, u128)> {
    if half_width_ppm == 0 {
        return None;
    }
    let delta = median * half_width_ppm / PPM;
    Some((median - delta, median + delta))
}

/// Band membership and scaled reward weight of a single vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEligibility {
    /// Whether the vote's price falls inside the IQR band.
    pub in_iqr_band: bool,
    /// Whether the vote's price falls inside the elastic band.
    pub in_elastic_band: bool,
    /// The vote's native weight scaled by the shares of the bands it
    /// occupies; zero if neither occupied band carries a share.
    pub reward_weight: u128,
}

/// Determine band membership and scaled reward weight for each
/// `(price, native_weight)` vote, in input order.
///
/// Returns the per-vote eligibility vector and the reward weight sum.
/// A band configured with a zero share contributes no reward weight
/// even to votes inside it.
pub fn reward_eligibility(
    votes: &[(u128, u128)],
    iqr_band: (u128, u128),
    elastic: Option<(u128, u128)>,
    elastic_share_bips: u128,
) -> (Vec<VoteEligibility>, u128) {
    let iqr_share_bips = BIPS.saturating_sub(elastic_share_bips);
    let mut eligibility = Vec::with_capacity(votes.len());
    let mut weight_sum = 0u128;

    for &(price, native_weight) in votes {
        let in_iqr_band = price >= iqr_band.0 && price <= iqr_band.1;
        let in_elastic_band = elastic.is_some_and(|(low, high)| price >= low && price <= high);

        let mut reward_weight = 0u128;
        if in_iqr_band {
            reward_weight += native_weight * iqr_share_bips / BIPS;
        }
        if in_elastic_band {
            reward_weight += native_weight * elastic_share_bips / BIPS;
        }
        weight_sum += reward_weight;

        eligibility.push(VoteEligibility {
            in_iqr_band,
            in_elastic_band,
            reward_weight,
        });
    }

    (eligibility, weight_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elastic_band_bounds() {
        // 2% half-width around 1000.
        let (low, high) = elastic_band(1000, 20_000).expect("band");
        assert_eq!(low, 980);
        assert_eq!(high, 1020);
    }

    #[test]
    fn test_elastic_band_zero_width_is_empty() {
        assert!(elastic_band(1000, 0).is_none());
    }

    #[test]
    fn test_elastic_band_full_width() {
        let (low, high) = elastic_band(1000, PPM).expect("band");
        assert_eq!(low, 0);
        assert_eq!(high, 2000);
    }

    #[test]
    fn test_iqr_only_eligibility() {
        let votes = [(30, 100), (35, 200), (40, 300), (50, 400)];
        let (elig, sum) = reward_eligibility(&votes, (35, 40), None, 0);
        assert!(!elig[0].in_iqr_band);
        assert!(elig[1].in_iqr_band);
        assert!(elig[2].in_iqr_band);
        assert!(!elig[3].in_iqr_band);
        // Full IQR share: weights pass through unscaled.
        assert_eq!(elig[1].reward_weight, 200);
        assert_eq!(elig[2].reward_weight, 300);
        assert_eq!(sum, 500);
    }

    #[test]
    fn test_band_bounds_inclusive() {
        let votes = [(35, 10), (40, 10)];
        let (elig, sum) = reward_eligibility(&votes, (35, 40), None, 0);
        assert!(elig[0].in_iqr_band);
        assert!(elig[1].in_iqr_band);
        assert_eq!(sum, 20);
    }

    #[test]
    fn test_vote_in_both_bands_accumulates_both_shares() {
        // 30% elastic share; the vote at 40 sits in both bands.
        let votes = [(40, 1000)];
        let (elig, sum) = reward_eligibility(&votes, (35, 45), Some((38, 42)), 3_000);
        assert!(elig[0].in_iqr_band);
        assert!(elig[0].in_elastic_band);
        assert_eq!(elig[0].reward_weight, 700 + 300);
        assert_eq!(sum, 1000);
    }

    #[test]
    fn test_elastic_only_membership() {
        // Price 50 is outside the IQR band but inside the elastic band.
        let votes = [(50, 1000)];
        let (elig, sum) = reward_eligibility(&votes, (35, 45), Some((40, 60)), 2_500);
        assert!(!elig[0].in_iqr_band);
        assert!(elig[0].in_elastic_band);
        assert_eq!(elig[0].reward_weight, 250);
        assert_eq!(sum, 250);
    }

    #[test]
    fn test_zero_share_band_contributes_nothing() {
        // The whole reward goes to the elastic band; an IQR-only vote
        // is in the band but earns nothing.
        let votes = [(36, 1000)];
        let (elig, sum) = reward_eligibility(&votes, (35, 45), Some((50, 60)), BIPS);
        assert!(elig[0].in_iqr_band);
        assert!(!elig[0].in_elastic_band);
        assert_eq!(elig[0].reward_weight, 0);
        assert_eq!(sum, 0);
    }

    #[test]
    fn test_zero_native_weight_vote_earns_nothing() {
        let votes = [(40, 0)];
        let (elig, sum) = reward_eligibility(&votes, (35, 45), None, 0);
        assert!(elig[0].in_iqr_band);
        assert_eq!(elig[0].reward_weight, 0);
        assert_eq!(sum, 0);
    }
}

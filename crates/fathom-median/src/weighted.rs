//! Weighted median and quartile band.
//!
//! Votes are sorted by price and scanned by cumulative weight:
//!
//! - the **median** is the price at which cumulative weight first
//!   exceeds half of the total; if it lands exactly on the boundary
//!   between two adjacent distinct prices, the median is the arithmetic
//!   mean of the two (the "closest price" tie-break),
//! - **quartile 1** is the lowest price at which cumulative weight from
//!   the left exceeds a quarter of the total,
//! - **quartile 3** is the highest price at which cumulative weight from
//!   the right exceeds a quarter of the total.
//!
//! Votes with zero weight are ignored entirely. Prices equal to a
//! quartile bound are inside the rewarded band, so a run of identical
//! prices can never straddle a band boundary.

use serde::{Deserialize, Serialize};

use crate::{MedianError, Result};

/// Aggregate statistics of one epoch's weighted vote set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedMedianData {
    /// The aggregate price.
    pub median_price: u128,
    /// Lower bound of the IQR reward band (inclusive).
    pub quartile1_price: u128,
    /// Upper bound of the IQR reward band (inclusive).
    pub quartile3_price: u128,
    /// Weight of votes priced strictly below the IQR band.
    pub low_weight_sum: u128,
    /// Weight of votes priced within the IQR band.
    pub rewarded_weight_sum: u128,
    /// Weight of votes priced strictly above the IQR band.
    pub high_weight_sum: u128,
    /// Total weight of all counted votes.
    pub total_weight: u128,
}

/// Compute the weighted median and quartile band over `(price, weight)`
/// votes. Zero-weight votes are not counted.
///
/// # Errors
///
/// - [`MedianError::EmptyVoteSet`] if no vote has positive weight
pub fn compute_weighted(votes: &[(u128, u128)]) -> Result<WeightedMedianData> {
    let mut counted: Vec<(u128, u128)> = votes.iter().copied().filter(|&(_, w)| w > 0).collect();
    if counted.is_empty() {
        return Err(MedianError::EmptyVoteSet);
    }
    counted.sort_by_key(|&(price, _)| price);
    let total: u128 = counted.iter().map(|&(_, w)| w).sum();

    let median_price = find_median(&counted, total);
    let quartile1_price = find_quartile(counted.iter().copied(), total);
    let quartile3_price = find_quartile(counted.iter().rev().copied(), total);

    let low_weight_sum: u128 = counted
        .iter()
        .filter(|&&(p, _)| p < quartile1_price)
        .map(|&(_, w)| w)
        .sum();
    let high_weight_sum: u128 = counted
        .iter()
        .filter(|&&(p, _)| p > quartile3_price)
        .map(|&(_, w)| w)
        .sum();

    Ok(WeightedMedianData {
        median_price,
        quartile1_price,
        quartile3_price,
        low_weight_sum,
        rewarded_weight_sum: total - low_weight_sum - high_weight_sum,
        high_weight_sum,
        total_weight: total,
    })
}

/// The price at which cumulative weight first exceeds half of `total`,
/// with the exact-boundary mean tie-break.
fn find_median(sorted: &[(u128, u128)], total: u128) -> u128 {
    let mut cum = 0u128;
    for (i, &(price, weight)) in sorted.iter().enumerate() {
        cum += weight;
        if 2 * cum > total {
            return price;
        }
        if 2 * cum == total {
            // Cumulative weight lands exactly on the half boundary:
            // average this price with the next vote's. An equal next
            // price averages to itself.
            return match sorted.get(i + 1) {
                Some(&(next, _)) => (price + next) / 2,
                None => price,
            };
        }
    }
    // Unreachable for a non-empty vote set; fall back to the top price.
    sorted[sorted.len() - 1].0
}

/// The first price, in iteration order, at which cumulative weight
/// exceeds a quarter of `total`.
fn find_quartile(votes: impl Iterator<Item = (u128, u128)>, total: u128) -> u128 {
    let mut cum = 0u128;
    let mut last = 0u128;
    for (price, weight) in votes {
        last = price;
        cum += weight;
        if 4 * cum > total {
            return price;
        }
    }
    last
}

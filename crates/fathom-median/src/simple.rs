//! Unweighted median and average.
//!
//! Degraded finalization paths ignore vote weight entirely: the
//! trusted-provider fallback takes the plain median of the trusted
//! reveals, and forced average finalization takes the arithmetic mean
//! of whatever reveals exist.

use crate::{MedianError, Result};

/// Unweighted median of `prices`; an even count yields the mean of the
/// two middle prices.
///
/// # Errors
///
/// - [`MedianError::EmptyVoteSet`] if `prices` is empty
pub fn simple_median(prices: &[u128]) -> Result<u128> {
    if prices.is_empty() {
        return Err(MedianError::EmptyVoteSet);
    }
    let mut sorted = prices.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 1 {
        Ok(sorted[n / 2])
    } else {
        Ok((sorted[n / 2 - 1] + sorted[n / 2]) / 2)
    }
}

/// Unweighted arithmetic mean of `prices`, truncated toward zero.
///
/// # Errors
///
/// - [`MedianError::EmptyVoteSet`] if `prices` is empty
pub fn simple_average(prices: &[u128]) -> Result<u128> {
    if prices.is_empty() {
        return Err(MedianError::EmptyVoteSet);
    }
    let sum: u128 = prices.iter().sum();
    Ok(sum / prices.len() as u128)
}

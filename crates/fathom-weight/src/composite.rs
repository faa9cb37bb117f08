//! Synthetic asset power for multi-asset (composite) instances.
//!
//! A composite instance has no direct asset of its own: its asset-class
//! vote power is blended across a configured list of child instances.
//! Each child contributes in proportion to the USD value of its own
//! holdings, priced at its own last finalized price:
//!
//! ```text
//! value_c          = total_power_c * price_c / 10^decimals_c
//! weighted_price_c = value_c * BIPS * price_c / sum(value)
//! power            = sum(holding_c * weighted_price_c / (BIPS * 10^decimals_c))
//! ```
//!
//! A child with no finalized price yet contributes zero. The valuation
//! is captured once, when an epoch is initialized for reveal, and
//! reused for every reveal of that epoch so later child finalizations
//! cannot shift weights mid-epoch.

use serde::{Deserialize, Serialize};

use fathom_types::{SnapshotId, VoterId, BIPS};

/// Narrow read-only view of a child oracle instance.
pub trait ChildInstance {
    /// The child's last finalized price in micro-USD, if any.
    fn last_price(&self) -> Option<u128>;

    /// Total outstanding power of the child's asset at `snapshot`.
    fn total_power(&self, snapshot: SnapshotId) -> u64;

    /// `account`'s holding of the child's asset at `snapshot`.
    fn voter_power(&self, account: &VoterId, snapshot: SnapshotId) -> u64;

    /// Decimal precision of the child's asset quantity.
    fn decimals(&self) -> u32;
}

/// Per-epoch valuation of a composite instance's children.
///
/// Captured at epoch initialization and pinned for the epoch's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeValuation {
    /// BIPS-scaled USD-share-weighted price per child.
    weighted_prices: Vec<u128>,
    /// Decimal precision per child.
    decimals: Vec<u32>,
    /// USD-normalized synthetic total asset power across all children.
    pub total_power: u64,
}

impl CompositeValuation {
    /// Value all children at `snapshot` using their last finalized
    /// prices.
    pub fn capture(children: &[Box<dyn ChildInstance>], snapshot: SnapshotId) -> Self {
        let mut values = Vec::with_capacity(children.len());
        let mut total_value = 0u128;
        for child in children {
            let price = child.last_price().unwrap_or(0);
            let power = u128::from(child.total_power(snapshot));
            let value = power * price / 10u128.pow(child.decimals());
            total_value += value;
            values.push((price, power, value));
        }

        let mut weighted_prices = Vec::with_capacity(children.len());
        let mut decimals = Vec::with_capacity(children.len());
        let mut total_power = 0u128;
        for (child, &(price, power, value)) in children.iter().zip(&values) {
            let weighted_price = if total_value == 0 {
                0
            } else {
                value * BIPS * price / total_value
            };
            total_power += power * weighted_price / (BIPS * 10u128.pow(child.decimals()));
            weighted_prices.push(weighted_price);
            decimals.push(child.decimals());
        }

        Self {
            weighted_prices,
            decimals,
            total_power: u64::try_from(total_power).unwrap_or(u64::MAX),
        }
    }

    /// `account`'s synthetic asset power under this valuation.
    pub fn voter_power(
        &self,
        children: &[Box<dyn ChildInstance>],
        account: &VoterId,
        snapshot: SnapshotId,
    ) -> u64 {
        let mut power = 0u128;
        for (i, child) in children.iter().enumerate() {
            let holding = u128::from(child.voter_power(account, snapshot));
            power += holding * self.weighted_prices[i] / (BIPS * 10u128.pow(self.decimals[i]));
        }
        u64::try_from(power).unwrap_or(u64::MAX)
    }

    /// The pinned BIPS-scaled weighted price of each child.
    pub fn weighted_prices(&self) -> &[u128] {
        &self.weighted_prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeChild {
        price: Option<u128>,
        total: u64,
        holdings: Vec<(VoterId, u64)>,
        decimals: u32,
    }

    impl ChildInstance for FakeChild {
        fn last_price(&self) -> Option<u128> {
            self.price
        }

        fn total_power(&self, _snapshot: SnapshotId) -> u64 {
            self.total
        }

        fn voter_power(&self, account: &VoterId, _snapshot: SnapshotId) -> u64 {
            self.holdings
                .iter()
                .find(|(a, _)| a == account)
                .map(|&(_, p)| p)
                .unwrap_or(0)
        }

        fn decimals(&self) -> u32 {
            self.decimals
        }
    }

    fn child(price: Option<u128>, total: u64, decimals: u32) -> Box<dyn ChildInstance> {
        Box::new(FakeChild {
            price,
            total,
            holdings: Vec::new(),
            decimals,
        })
    }

    #[test]
    fn test_reference_valuation() {
        // Reference deployment vector: three 3-decimal children with
        // powers [2e6, 6e8, 3e7] priced at [3, 5, 7].
        let children = vec![
            child(Some(3), 2_000_000, 3),
            child(Some(5), 600_000_000, 3),
            child(Some(7), 30_000_000, 3),
        ];
        let valuation = CompositeValuation::capture(&children, 1);
        assert_eq!(valuation.weighted_prices(), &[55, 46641, 4570]);
        assert_eq!(valuation.total_power, 2_812_181);
    }

    #[test]
    fn test_zero_prices_contribute_nothing() {
        let children = vec![
            child(Some(0), 2_000_000, 3),
            child(None, 600_000_000, 3),
        ];
        let valuation = CompositeValuation::capture(&children, 1);
        assert_eq!(valuation.weighted_prices(), &[0, 0]);
        assert_eq!(valuation.total_power, 0);
    }

    #[test]
    fn test_single_child_dominates() {
        // One child holds all the value: its weighted price is the full
        // BIPS-scaled price and the synthetic total equals its USD value.
        let children = vec![child(Some(5), 1_000_000, 3), child(None, 999, 3)];
        let valuation = CompositeValuation::capture(&children, 1);
        assert_eq!(valuation.weighted_prices()[0], 5 * BIPS);
        assert_eq!(valuation.weighted_prices()[1], 0);
        assert_eq!(valuation.total_power, 5_000);
    }

    #[test]
    fn test_voter_power_blends_holdings() {
        let voter: VoterId = [1u8; 32];
        let children: Vec<Box<dyn ChildInstance>> = vec![
            Box::new(FakeChild {
                price: Some(5),
                total: 1_000_000,
                holdings: vec![(voter, 200_000)],
                decimals: 3,
            }),
            Box::new(FakeChild {
                price: None,
                total: 999,
                holdings: vec![(voter, 999)],
                decimals: 3,
            }),
        ];
        let valuation = CompositeValuation::capture(&children, 1);
        // Only the priced child counts: 200_000 * 50_000 / (BIPS * 1e3).
        assert_eq!(valuation.voter_power(&children, &voter, 1), 1_000);
        assert_eq!(valuation.voter_power(&children, &[9u8; 32], 1), 0);
    }

    #[test]
    fn test_valuation_is_pinned() {
        // The valuation must not re-read children after capture; verify
        // it carries its own state by valuing a different voter set.
        let children = vec![child(Some(3), 2_000_000, 3)];
        let valuation = CompositeValuation::capture(&children, 1);
        let serialized = serde_json::to_string(&valuation).expect("serialize");
        let restored: CompositeValuation =
            serde_json::from_str(&serialized).expect("deserialize");
        assert_eq!(restored, valuation);
    }
}

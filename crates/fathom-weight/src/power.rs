//! Vote-power queries, capping, and normalization.
//!
//! Raw vote power is always read at a frozen historical snapshot, never
//! from live state: the snapshot is pinned strictly before reveals open,
//! so power acquired afterwards (flash capital) can never count.

use serde::{Deserialize, Serialize};

use fathom_types::{SnapshotId, VoterId, TERA};

/// The two independent vote-power classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerClass {
    /// The native holding quantity.
    Native,
    /// The asset holding quantity.
    Asset,
}

/// Read-only historical vote-power ledger.
///
/// Both queries must be pure point reads of an immutable snapshot: for
/// a given `(account, snapshot, class)` the answer never changes.
pub trait VotePowerSource {
    /// Raw vote power of `account` in `class` at `snapshot`.
    fn raw_power(&self, account: &VoterId, snapshot: SnapshotId, class: PowerClass) -> u64;

    /// Total outstanding power in `class` at `snapshot`.
    fn total_power(&self, snapshot: SnapshotId, class: PowerClass) -> u64;
}

/// Cap a single voter's counted power at `total / divisor`.
///
/// The divisor is validated positive at configuration time.
pub fn cap_power(raw: u64, total: u64, divisor: u64) -> u64 {
    raw.min(total / divisor)
}

/// Normalize capped power into TERA parts of its class total.
///
/// A zero class total normalizes to zero weight.
pub fn normalize_power(capped: u64, total: u64) -> u128 {
    if total == 0 {
        return 0;
    }
    u128::from(capped) * TERA / u128::from(total)
}

/// Convert a raw asset holding into USD-normalized vote power:
/// `power * price / 10^decimals`, saturating at `u64::MAX`.
///
/// `price` is in micro-USD, so the result is a micro-USD value.
pub fn usd_power(power: u64, price: u128, decimals: u32) -> u64 {
    let value = u128::from(power) * price / 10u128.pow(decimals);
    u64::try_from(value).unwrap_or(u64::MAX)
}

//! Integration test: full commit-reveal-finalize cycle.
//!
//! Exercises the complete epoch lifecycle:
//! 1. Voters commit price hashes during the submit window
//! 2. The manager pins the vote-power snapshot before reveals open
//! 3. Voters reveal; weights derive from the pinned snapshot
//! 4. Finalization produces the weighted median, reward bands, and the
//!    reward set consumed by the external reward distributor
//!
//! Uses fathom-epoch (oracle, commitments), fathom-weight (power
//! source), and fathom-types (schedule, configuration).

use std::collections::HashMap;

use fathom_epoch::commit::commitment_hash;
use fathom_epoch::oracle::{AssetMode, PriceOracle};
use fathom_types::config::EpochConfig;
use fathom_types::schedule::EpochSchedule;
use fathom_types::{FinalizationKind, SnapshotId, VoterId, TERA};
use fathom_weight::power::{PowerClass, VotePowerSource};

const MANAGER: VoterId = [0xAA; 32];

/// A frozen native-power ledger; the asset class is empty.
struct Ledger {
    native: HashMap<VoterId, u64>,
    total: u64,
}

impl Ledger {
    fn new(holdings: &[(VoterId, u64)]) -> Self {
        Self {
            native: holdings.iter().copied().collect(),
            total: holdings.iter().map(|&(_, p)| p).sum(),
        }
    }
}

impl VotePowerSource for Ledger {
    fn raw_power(&self, account: &VoterId, _snapshot: SnapshotId, class: PowerClass) -> u64 {
        match class {
            PowerClass::Native => self.native.get(account).copied().unwrap_or(0),
            PowerClass::Asset => 0,
        }
    }

    fn total_power(&self, _snapshot: SnapshotId, class: PowerClass) -> u64 {
        match class {
            PowerClass::Native => self.total,
            PowerClass::Asset => 0,
        }
    }
}

fn voter(id: u8) -> VoterId {
    [id; 32]
}

fn make_oracle(config: EpochConfig) -> PriceOracle {
    let schedule = EpochSchedule::new(5, 120, 60).expect("valid schedule");
    PriceOracle::new(MANAGER, schedule, config, AssetMode::None, 8, 1_000)
        .expect("valid oracle")
}

/// Drive epoch 0 through commit, snapshot pinning, and reveal for every
/// listed `(voter, price)` pair.
fn run_epoch_zero(oracle: &mut PriceOracle, ledger: &Ledger, reveals: &[(VoterId, u128)]) {
    let mut nonces = Vec::new();
    for &(v, price) in reveals {
        let nonce = rand::random::<[u8; 32]>();
        let hash = commitment_hash(price, &nonce, &v);
        oracle.submit_hash(v, 0, hash, 10).expect("submit");
        nonces.push(nonce);
    }
    oracle
        .initialize_for_reveal(&MANAGER, 0, 50, 100, false, ledger, 100)
        .expect("initialize");
    for (&(v, price), nonce) in reveals.iter().zip(&nonces) {
        oracle
            .reveal_price(v, 0, price, nonce, ledger, 130)
            .expect("reveal");
    }
}

#[test]
fn weighted_median_cycle_with_rewards() {
    // =========================================================
    // Setup: five voters, powers [500, 200, 1000, 300, 500]
    // =========================================================
    let ledger = Ledger::new(&[
        (voter(1), 500),
        (voter(2), 200),
        (voter(3), 1000),
        (voter(4), 300),
        (voter(5), 500),
    ]);
    let config = EpochConfig {
        native_cap_divisor: 1,
        asset_cap_divisor: 1,
        low_turnout_bips: 0,
        ..EpochConfig::default()
    };
    let mut oracle = make_oracle(config);

    let reveals = [
        (voter(1), 30u128),
        (voter(2), 35),
        (voter(3), 40),
        (voter(4), 35),
        (voter(5), 50),
    ];
    run_epoch_zero(&mut oracle, &ledger, &reveals);

    // =========================================================
    // Finalize: median 40, IQR band [35, 40]
    // =========================================================
    oracle.finalize(&MANAGER, 0, 185).expect("finalize");

    let current = oracle.current_price();
    assert_eq!(current.price, 40);
    assert_eq!(current.timestamp, 185);
    assert_eq!(current.kind, FinalizationKind::WeightedMedian);

    let report = oracle.epoch_report(0, 200).expect("report");
    assert_eq!(report.outcome.iqr_low, 35);
    assert_eq!(report.outcome.iqr_high, 40);
    assert_eq!(report.vote_count, 5);

    // =========================================================
    // Rewards: voters 2, 3, 4 are inside the band; their native
    // weights are power * TERA / 2500
    // =========================================================
    let rewards = oracle.reward_set(0).expect("rewards");
    assert!(rewards.kind.is_rewarded());
    assert_eq!(rewards.voters, vec![voter(2), voter(3), voter(4)]);
    assert_eq!(
        rewards.weights,
        vec![200 * TERA / 2500, 1000 * TERA / 2500, 300 * TERA / 2500]
    );
    assert_eq!(rewards.weight_sum, 1500 * TERA / 2500);

    // Per-voter reveal history is retained.
    assert_eq!(oracle.voter_price(0, &voter(1)).expect("lookup"), Some(30));
    assert_eq!(oracle.voter_price(0, &voter(9)).expect("lookup"), None);
}

#[test]
fn weight_dominance_collapses_band() {
    // Voter B holds ten percent of total power; A holds two percent;
    // C reveals with zero power. B's weight dominates, so the median
    // lands on B's price and the IQR band collapses onto it.
    let ledger = Ledger::new(&[(voter(1), 200), (voter(2), 1_000), (voter(3), 0), (voter(8), 8_800)]);
    let config = EpochConfig {
        native_cap_divisor: 1,
        asset_cap_divisor: 1,
        low_turnout_bips: 1_000,
        ..EpochConfig::default()
    };
    let mut oracle = make_oracle(config);

    let reveals = [(voter(1), 500u128), (voter(2), 250), (voter(3), 400)];
    run_epoch_zero(&mut oracle, &ledger, &reveals);
    oracle.finalize(&MANAGER, 0, 185).expect("finalize");

    let report = oracle.epoch_report(0, 200).expect("report");
    assert_eq!(report.outcome.price, 250);
    assert_eq!(report.outcome.iqr_low, 250);
    assert_eq!(report.outcome.iqr_high, 250);
    assert_eq!(report.outcome.kind, FinalizationKind::WeightedMedian);

    let rewards = oracle.reward_set(0).expect("rewards");
    assert_eq!(rewards.voters, vec![voter(2)]);
}

#[test]
fn elastic_band_extends_rewards() {
    // A 30% elastic share with a 25% half-width around the median pulls
    // near-median voters outside the IQR band into the reward set.
    let ledger = Ledger::new(&[
        (voter(1), 500),
        (voter(2), 200),
        (voter(3), 1000),
        (voter(4), 300),
        (voter(5), 500),
    ]);
    let config = EpochConfig {
        native_cap_divisor: 1,
        asset_cap_divisor: 1,
        low_turnout_bips: 0,
        elastic_share_bips: 3_000,
        elastic_half_width_ppm: 250_000,
        ..EpochConfig::default()
    };
    let mut oracle = make_oracle(config);

    let reveals = [
        (voter(1), 30u128),
        (voter(2), 35),
        (voter(3), 40),
        (voter(4), 35),
        (voter(5), 50),
    ];
    run_epoch_zero(&mut oracle, &ledger, &reveals);
    oracle.finalize(&MANAGER, 0, 185).expect("finalize");

    // Median 40, elastic band [30, 50]: every voter is inside it.
    let report = oracle.epoch_report(0, 200).expect("report");
    assert_eq!(report.outcome.elastic_low, 30);
    assert_eq!(report.outcome.elastic_high, 50);

    let rewards = oracle.reward_set(0).expect("rewards");
    assert_eq!(
        rewards.voters,
        vec![voter(1), voter(2), voter(3), voter(4), voter(5)]
    );
    // Band voters carry 70% + 30%; edge voters only the elastic 30%.
    let w = |power: u128| power * TERA / 2500;
    assert_eq!(
        rewards.weights,
        vec![
            w(500) * 3 / 10,
            w(200),
            w(1000),
            w(300),
            w(500) * 3 / 10,
        ]
    );
}

#[test]
fn consecutive_epochs_update_current_price() {
    let ledger = Ledger::new(&[(voter(1), 400)]);
    let config = EpochConfig {
        native_cap_divisor: 1,
        asset_cap_divisor: 1,
        low_turnout_bips: 0,
        ..EpochConfig::default()
    };
    let mut oracle = make_oracle(config);

    run_epoch_zero(&mut oracle, &ledger, &[(voter(1), 500)]);
    oracle.finalize(&MANAGER, 0, 185).expect("finalize epoch 0");
    assert_eq!(oracle.current_price().price, 500);

    // Epoch 1 submits during [125, 245), reveals during [245, 305).
    let nonce = rand::random::<[u8; 32]>();
    let hash = commitment_hash(600, &nonce, &voter(1));
    oracle.submit_hash(voter(1), 1, hash, 200).expect("submit");
    oracle
        .initialize_for_reveal(&MANAGER, 1, 60, 200, false, &ledger, 240)
        .expect("initialize");
    oracle
        .reveal_price(voter(1), 1, 600, &nonce, &ledger, 250)
        .expect("reveal");
    oracle.finalize(&MANAGER, 1, 305).expect("finalize epoch 1");

    let current = oracle.current_price();
    assert_eq!(current.price, 600);
    assert_eq!(current.timestamp, 305);
}

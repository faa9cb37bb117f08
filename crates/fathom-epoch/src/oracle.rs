//! The price oracle facade.
//!
//! One [`PriceOracle`] instance drives the full commit-reveal cycle for
//! a single asset: voters submit and reveal, the managing account pins
//! snapshots and finalizes, and consumers read the current price and
//! retained epoch history. All state transitions are synchronous and
//! single-writer; time enters only through explicit `now` parameters.

use serde::{Deserialize, Serialize};

use fathom_types::{
    config::EpochConfig, schedule::EpochSchedule, FinalizationKind, SnapshotId, VoterId, MAX_PRICE,
};
use fathom_weight::blend::{VoterWeights, WeightBlender};
use fathom_weight::composite::{ChildInstance, CompositeValuation};
use fathom_weight::power::{usd_power, PowerClass, VotePowerSource};
use fathom_weight::WeightError;

use crate::commit::{commitment_hash, CommitmentHash};
use crate::epoch::{EpochOutcome, RevealInit};
use crate::fallback;
use crate::store::EpochStore;
use crate::vote::{RewardSet, Vote};
use crate::{EpochError, Result};

/// How the instance's asset-class vote power is obtained.
pub enum AssetMode {
    /// No asset class: weights are always all-native.
    None,
    /// A single direct asset with the given decimal precision; asset
    /// power is USD-normalized at the instance's own reference price.
    Direct {
        /// Decimal precision of the asset quantity.
        decimals: u32,
    },
    /// A composite instance blending a list of child instances.
    Composite(Vec<Box<dyn ChildInstance>>),
}

/// The current aggregate price with its provenance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReport {
    /// Aggregate price in micro-USD.
    pub price: u128,
    /// Wall-clock time the price was finalized; zero for the configured
    /// initial price.
    pub timestamp: u64,
    /// Which decision-ladder path produced the price.
    pub kind: FinalizationKind,
}

/// A finalized epoch's outcome together with its participation count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochReport {
    /// The reported epoch.
    pub epoch_id: u64,
    /// The immutable finalization outcome.
    pub outcome: EpochOutcome,
    /// Number of accepted reveals.
    pub vote_count: usize,
}

/// The epoch aggregation engine for one asset.
pub struct PriceOracle {
    manager: VoterId,
    schedule: EpochSchedule,
    config: EpochConfig,
    asset: AssetMode,
    store: EpochStore,
    current: PriceReport,
}

impl core::fmt::Debug for PriceOracle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PriceOracle")
            .field("manager", &self.manager)
            .field("schedule", &self.schedule)
            .field("config", &self.config)
            .field("store", &self.store)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl PriceOracle {
    /// Create an oracle retaining `capacity` epochs, seeded with
    /// `initial_price` until the first epoch finalizes.
    ///
    /// # Errors
    ///
    /// - [`EpochError::Config`] if the configuration is invalid
    /// - [`EpochError::PriceOutOfRange`] if `initial_price` exceeds
    ///   [`MAX_PRICE`]
    pub fn new(
        manager: VoterId,
        schedule: EpochSchedule,
        config: EpochConfig,
        asset: AssetMode,
        capacity: usize,
        initial_price: u128,
    ) -> Result<Self> {
        config.validate()?;
        if initial_price > MAX_PRICE {
            return Err(EpochError::PriceOutOfRange { price: initial_price });
        }
        Ok(Self {
            manager,
            schedule,
            config,
            asset,
            store: EpochStore::new(capacity),
            current: PriceReport {
                price: initial_price,
                timestamp: 0,
                kind: FinalizationKind::CarriedForward,
            },
        })
    }

    /// The epoch schedule.
    pub fn schedule(&self) -> &EpochSchedule {
        &self.schedule
    }

    /// The configuration in force for epochs not yet initialized.
    pub fn config(&self) -> &EpochConfig {
        &self.config
    }

    /// The epoch currently accepting submissions.
    pub fn current_epoch_id(&self, now: u64) -> u64 {
        self.schedule.epoch_id(now)
    }

    fn require_manager(&self, actor: &VoterId) -> Result<()> {
        if actor != &self.manager {
            return Err(EpochError::AccessDenied);
        }
        Ok(())
    }

    /// Record a voter's price commitment for the current epoch.
    ///
    /// # Errors
    ///
    /// - [`EpochError::WindowViolation`] if `epoch_id` is not the epoch
    ///   currently accepting submissions, or its submit window has not
    ///   opened yet
    /// - [`EpochError::DuplicateSubmission`] if the voter already
    ///   committed in this epoch
    pub fn submit_hash(
        &mut self,
        voter: VoterId,
        epoch_id: u64,
        hash: CommitmentHash,
        now: u64,
    ) -> Result<()> {
        // Pre-genesis times map to epoch 0, so the current-epoch check
        // alone would admit commitments before epoch 0 opens.
        if epoch_id != self.schedule.epoch_id(now) || now < self.schedule.submit_start(epoch_id) {
            return Err(EpochError::WindowViolation { epoch_id, now });
        }
        self.store.get_or_create(epoch_id)?.record_commit(voter, hash)?;
        tracing::trace!(epoch_id, "commitment recorded");
        Ok(())
    }

    /// Pin the epoch's vote-power snapshot and open it for reveal.
    ///
    /// `position` is the chain/state position current at call time; the
    /// snapshot must lie strictly before it so no power acquired after
    /// the snapshot was chosen can count. The epoch enters fallback mode
    /// if `fallback` is set by the manager or the snapshot's native
    /// total power is zero. The configuration in force is captured into
    /// the epoch; later [`PriceOracle::set_config`] calls cannot affect
    /// it.
    ///
    /// # Errors
    ///
    /// - [`EpochError::AccessDenied`] if `actor` is not the manager
    /// - [`EpochError::WindowViolation`] if the epoch's reveal window
    ///   has already closed, has not been scheduled yet, or the epoch is
    ///   already initialized
    /// - [`EpochError::SnapshotInFuture`] if `snapshot >= position`
    pub fn initialize_for_reveal(
        &mut self,
        actor: &VoterId,
        epoch_id: u64,
        snapshot: SnapshotId,
        position: u64,
        fallback: bool,
        source: &dyn VotePowerSource,
        now: u64,
    ) -> Result<()> {
        self.require_manager(actor)?;
        if now < self.schedule.submit_start(epoch_id) || now >= self.schedule.reveal_end(epoch_id) {
            return Err(EpochError::WindowViolation { epoch_id, now });
        }
        if snapshot >= position {
            return Err(EpochError::SnapshotInFuture { snapshot, position });
        }

        let native_total = source.total_power(snapshot, PowerClass::Native);
        let (asset_total, asset_ref_price, has_asset, valuation) = match &self.asset {
            AssetMode::None => (0, 0, false, None),
            AssetMode::Direct { decimals } => {
                let raw_total = source.total_power(snapshot, PowerClass::Asset);
                let ref_price = self.current.price;
                (usd_power(raw_total, ref_price, *decimals), ref_price, true, None)
            }
            AssetMode::Composite(children) => {
                let valuation = CompositeValuation::capture(children, snapshot);
                (valuation.total_power, 0, true, Some(valuation))
            }
        };

        let fallback_mode = fallback || native_total == 0;
        if fallback_mode {
            tracing::warn!(epoch_id, native_total, "epoch initialized in fallback mode");
        }

        let init = RevealInit {
            snapshot,
            native_total,
            asset_total,
            asset_ref_price,
            has_asset,
            fallback_mode,
            config: self.config.clone(),
            valuation,
        };
        self.store.get_or_create(epoch_id)?.initialize(init, now)?;
        tracing::info!(epoch_id, snapshot, native_total, asset_total, "epoch initialized for reveal");
        Ok(())
    }

    /// Reveal a voter's committed price.
    ///
    /// Weights are computed here, once, from the epoch's pinned
    /// snapshot. In fallback mode only trusted providers may reveal. A
    /// trusted provider below the power floors reveals with zero weight
    /// so the trusted-median path can still see its price.
    ///
    /// # Errors
    ///
    /// - [`EpochError::WindowViolation`] outside the reveal window
    /// - [`EpochError::NotInitialized`] if the epoch was never
    ///   initialized, or the voter is not trusted while the epoch is in
    ///   fallback mode
    /// - [`EpochError::PriceOutOfRange`] if `price > MAX_PRICE`
    /// - [`EpochError::RevealMismatch`] without a matching commitment
    /// - [`EpochError::DuplicateSubmission`] on a second reveal
    /// - [`EpochError::Weight`] if the voter is below both power floors
    pub fn reveal_price(
        &mut self,
        voter: VoterId,
        epoch_id: u64,
        price: u128,
        nonce: &[u8; 32],
        source: &dyn VotePowerSource,
        now: u64,
    ) -> Result<()> {
        if !self.schedule.reveal_in_progress(epoch_id, now) {
            return Err(EpochError::WindowViolation { epoch_id, now });
        }

        let (init, committed) = {
            let epoch = self.store.get(epoch_id).map_err(|err| match err {
                EpochError::NotYetAvailable { .. } => EpochError::NotInitialized { epoch_id },
                other => other,
            })?;
            let init = epoch
                .reveal_init()
                .cloned()
                .ok_or(EpochError::NotInitialized { epoch_id })?;
            (init, epoch.commitment(&voter))
        };

        if init.fallback_mode && !init.config.is_trusted(&voter) {
            return Err(EpochError::NotInitialized { epoch_id });
        }
        if price > MAX_PRICE {
            return Err(EpochError::PriceOutOfRange { price });
        }
        let committed = committed.ok_or(EpochError::RevealMismatch)?;
        if committed != commitment_hash(price, nonce, &voter) {
            return Err(EpochError::RevealMismatch);
        }

        let native_raw = source.raw_power(&voter, init.snapshot, PowerClass::Native);
        let asset_usd = match &self.asset {
            AssetMode::None => 0,
            AssetMode::Direct { decimals } => usd_power(
                source.raw_power(&voter, init.snapshot, PowerClass::Asset),
                init.asset_ref_price,
                *decimals,
            ),
            AssetMode::Composite(children) => init
                .valuation
                .as_ref()
                .map_or(0, |v| v.voter_power(children, &voter, init.snapshot)),
        };

        let blender = WeightBlender::from_config(&init.config);
        let weights = match blender.weigh(
            native_raw,
            asset_usd,
            init.native_total,
            init.asset_total,
            init.has_asset,
        ) {
            Ok(weights) => weights,
            // Trusted reveals survive the floor with zero weight.
            Err(WeightError::BelowPowerFloor { .. }) if init.config.is_trusted(&voter) => {
                VoterWeights {
                    combined: 0,
                    native_only: 0,
                }
            }
            Err(err) => return Err(err.into()),
        };

        self.store.get_mut(epoch_id)?.record_vote(Vote {
            voter,
            price,
            weight: weights.combined,
            native_weight: weights.native_only,
        })?;
        tracing::trace!(epoch_id, price, weight = weights.combined, "price revealed");
        Ok(())
    }

    fn check_finalizable(&mut self, actor: &VoterId, epoch_id: u64, now: u64) -> Result<()> {
        self.require_manager(actor)?;
        if now < self.schedule.reveal_end(epoch_id) {
            return Err(EpochError::WindowViolation { epoch_id, now });
        }
        // Creates the epoch if nobody ever touched it: zero-vote epochs
        // must still finalize so the schedule never stalls.
        let epoch = self.store.get_or_create(epoch_id)?;
        if epoch.is_finalized() {
            return Err(EpochError::AlreadyFinalized { epoch_id });
        }
        Ok(())
    }

    /// Finalize an epoch through the automatic decision ladder.
    ///
    /// # Errors
    ///
    /// - [`EpochError::AccessDenied`] if `actor` is not the manager
    /// - [`EpochError::WindowViolation`] before the reveal window closes
    /// - [`EpochError::AlreadyFinalized`] on a second finalization
    pub fn finalize(&mut self, actor: &VoterId, epoch_id: u64, now: u64) -> Result<()> {
        self.check_finalizable(actor, epoch_id, now)?;
        let previous = self.current.price;

        let epoch = self.store.get_mut(epoch_id)?;
        let (config, fallback_mode) = match epoch.reveal_init() {
            Some(init) => (init.config.clone(), init.fallback_mode),
            // Never initialized: no reveals exist, carry forward.
            None => (self.config.clone(), true),
        };
        let decision = fallback::decide(epoch.votes(), &config, fallback_mode, previous);
        let outcome = EpochOutcome {
            price: decision.price,
            iqr_low: decision.iqr.0,
            iqr_high: decision.iqr.1,
            elastic_low: decision.elastic.0,
            elastic_high: decision.elastic.1,
            kind: decision.kind,
            finalized_at: now,
        };
        epoch.finalize(outcome, decision.rewards)?;

        self.current = PriceReport {
            price: outcome.price,
            timestamp: now,
            kind: outcome.kind,
        };
        tracing::info!(epoch_id, price = outcome.price, kind = ?outcome.kind, "epoch finalized");
        Ok(())
    }

    fn finalize_forced(
        &mut self,
        epoch_id: u64,
        price: u128,
        kind: FinalizationKind,
        now: u64,
    ) -> Result<()> {
        let outcome = EpochOutcome {
            price,
            iqr_low: price,
            iqr_high: price,
            elastic_low: price,
            elastic_high: price,
            kind,
            finalized_at: now,
        };
        self.store
            .get_mut(epoch_id)?
            .finalize(outcome, RewardSet::empty(kind))?;
        self.current = PriceReport {
            price,
            timestamp: now,
            kind,
        };
        tracing::warn!(epoch_id, price, kind = ?kind, "epoch force-finalized");
        Ok(())
    }

    /// Force-finalize on the unweighted average of whatever reveals
    /// exist; carries the previous price forward if there are none.
    ///
    /// # Errors
    ///
    /// Same as [`PriceOracle::finalize`].
    pub fn force_finalize_average(
        &mut self,
        actor: &VoterId,
        epoch_id: u64,
        now: u64,
    ) -> Result<()> {
        self.check_finalizable(actor, epoch_id, now)?;
        let prices: Vec<u128> = self
            .store
            .get(epoch_id)?
            .votes()
            .iter()
            .map(|v| v.price)
            .collect();
        let (price, kind) = match fathom_median::simple::simple_average(&prices) {
            Ok(average) => (average, FinalizationKind::ForcedAverage),
            Err(_) => (self.current.price, FinalizationKind::ForcedCarriedForward),
        };
        self.finalize_forced(epoch_id, price, kind, now)
    }

    /// Force-finalize by carrying the previous price forward.
    ///
    /// # Errors
    ///
    /// Same as [`PriceOracle::finalize`].
    pub fn force_finalize_carry(
        &mut self,
        actor: &VoterId,
        epoch_id: u64,
        now: u64,
    ) -> Result<()> {
        self.check_finalizable(actor, epoch_id, now)?;
        self.finalize_forced(
            epoch_id,
            self.current.price,
            FinalizationKind::ForcedCarriedForward,
            now,
        )
    }

    /// Replace the configuration, effective for epochs not yet
    /// initialized for reveal.
    ///
    /// # Errors
    ///
    /// - [`EpochError::AccessDenied`] if `actor` is not the manager
    /// - [`EpochError::Config`] if the configuration is invalid
    pub fn set_config(&mut self, actor: &VoterId, config: EpochConfig) -> Result<()> {
        self.require_manager(actor)?;
        config.validate()?;
        tracing::info!("configuration replaced");
        self.config = config;
        Ok(())
    }

    /// The current aggregate price with timestamp and finalization kind.
    pub fn current_price(&self) -> PriceReport {
        self.current
    }

    /// A finalized epoch's full report.
    ///
    /// # Errors
    ///
    /// - [`EpochError::NotYetAvailable`] for a future or not-yet
    ///   finalized epoch
    /// - [`EpochError::DataEvicted`] past the retention horizon
    pub fn epoch_report(&self, epoch_id: u64, now: u64) -> Result<EpochReport> {
        if epoch_id > self.schedule.epoch_id(now) {
            return Err(EpochError::NotYetAvailable { epoch_id });
        }
        let epoch = self.store.get(epoch_id)?;
        let outcome = epoch
            .outcome()
            .copied()
            .ok_or(EpochError::NotYetAvailable { epoch_id })?;
        Ok(EpochReport {
            epoch_id,
            outcome,
            vote_count: epoch.votes().len(),
        })
    }

    /// The price `voter` revealed in a retained epoch, if any.
    ///
    /// # Errors
    ///
    /// Same retention errors as [`PriceOracle::epoch_report`].
    pub fn voter_price(&self, epoch_id: u64, voter: &VoterId) -> Result<Option<u128>> {
        Ok(self.store.get(epoch_id)?.voter_price(voter))
    }

    /// The reward interface of a finalized epoch.
    ///
    /// # Errors
    ///
    /// Same retention errors as [`PriceOracle::epoch_report`].
    pub fn reward_set(&self, epoch_id: u64) -> Result<&RewardSet> {
        self.store
            .get(epoch_id)?
            .rewards()
            .ok_or(EpochError::NotYetAvailable { epoch_id })
    }
}

//! Epoch timing.
//!
//! Epoch identity is a deterministic function of wall-clock time and two
//! fixed parameters: the genesis offset and the submit period length.
//! Epoch `i` accepts price commitments during
//! `[genesis + i * submit_period, genesis + (i + 1) * submit_period)` and
//! accepts reveals during the `reveal_period` seconds that follow.
//!
//! Time is never read from an ambient clock: every check takes an
//! explicit `now` parameter so the state machine is testable with
//! synthetic clocks.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Epoch timing parameters, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochSchedule {
    /// Unix timestamp at which epoch 0 starts accepting commitments.
    pub genesis: u64,
    /// Length of the commitment (submit) window in seconds.
    pub submit_period: u64,
    /// Length of the reveal window in seconds.
    pub reveal_period: u64,
}

impl EpochSchedule {
    /// Create a schedule.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroPeriod`] if either period is zero
    pub fn new(genesis: u64, submit_period: u64, reveal_period: u64) -> Result<Self, ConfigError> {
        if submit_period == 0 || reveal_period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(Self {
            genesis,
            submit_period,
            reveal_period,
        })
    }

    /// The epoch id whose submit window contains `now`.
    ///
    /// Times before genesis map to epoch 0.
    pub fn epoch_id(&self, now: u64) -> u64 {
        now.saturating_sub(self.genesis) / self.submit_period
    }

    /// Start of the submit window of `epoch_id`.
    ///
    /// Saturates at `u64::MAX` for ids beyond the representable range;
    /// a saturated window can never admit an action, so hostile epoch
    /// ids fail window checks instead of wrapping.
    pub fn submit_start(&self, epoch_id: u64) -> u64 {
        self.genesis
            .saturating_add(epoch_id.saturating_mul(self.submit_period))
    }

    /// End of the submit window of `epoch_id` (exclusive).
    pub fn submit_end(&self, epoch_id: u64) -> u64 {
        self.submit_start(epoch_id).saturating_add(self.submit_period)
    }

    /// Start of the reveal window of `epoch_id`: the instant its submit
    /// window closes.
    pub fn reveal_start(&self, epoch_id: u64) -> u64 {
        self.submit_end(epoch_id)
    }

    /// End of the reveal window of `epoch_id` (exclusive).
    pub fn reveal_end(&self, epoch_id: u64) -> u64 {
        self.submit_end(epoch_id).saturating_add(self.reveal_period)
    }

    /// Whether `now` falls inside the reveal window of `epoch_id`.
    pub fn reveal_in_progress(&self, epoch_id: u64, now: u64) -> bool {
        now >= self.reveal_start(epoch_id) && now < self.reveal_end(epoch_id)
    }
}

//! # fathom-median
//!
//! Outlier-resistant finalization statistics for the Fathom price oracle.
//!
//! The core algorithm is the weighted median: the aggregate price is the
//! revealed price at which cumulative vote weight first crosses half of
//! the total. Around it sit two reward bands:
//!
//! - the **IQR band**, bounded by the weighted quartile prices, and
//! - the **elastic band**, a configurable-width interval
//!   `median * (1 ± half_width)`.
//!
//! Both bands select reward-eligible voters; the degraded finalization
//! paths use the unweighted statistics in [`simple`] instead.
//!
//! ## Modules
//!
//! - [`weighted`] — weighted median and quartile band
//! - [`band`] — elastic band and reward eligibility
//! - [`simple`] — unweighted median and average for degraded paths

pub mod band;
pub mod simple;
pub mod weighted;

/// Error types for median computations.
#[derive(Debug, thiserror::Error)]
pub enum MedianError {
    /// No votes with positive weight were supplied.
    #[error("no votes with positive weight")]
    EmptyVoteSet,
}

/// Convenience result type for median computations.
pub type Result<T> = std::result::Result<T, MedianError>;

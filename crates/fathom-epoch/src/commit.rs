//! Price commitment hashing.
//!
//! `commitment = BLAKE3::derive_key("Fathom v1 price-commitment",
//! len(price) || price || len(nonce) || nonce || len(voter) || voter)`
//! with little-endian `u32` length prefixes.
//!
//! The commitment binds the voter identity, so a commitment copied from
//! another voter's submission can never be revealed: the recomputed hash
//! at reveal time uses the revealing voter's own identity.

use fathom_types::VoterId;

/// Domain-separation context for the price commitment hash.
pub const PRICE_COMMITMENT_CONTEXT: &str = "Fathom v1 price-commitment";

/// A 32-byte price commitment.
pub type CommitmentHash = [u8; 32];

/// Compute the commitment hash over `(price, nonce, voter)`.
///
/// Each field is prefixed with its byte length as a little-endian `u32`
/// so no two field boundaries can collide.
pub fn commitment_hash(price: u128, nonce: &[u8; 32], voter: &VoterId) -> CommitmentHash {
    let mut hasher = blake3::Hasher::new_derive_key(PRICE_COMMITMENT_CONTEXT);
    for field in [&price.to_le_bytes()[..], &nonce[..], &voter[..]] {
        hasher.update(&u32::try_from(field.len()).unwrap_or(u32::MAX).to_le_bytes());
        hasher.update(field);
    }
    *hasher.finalize().as_bytes()
}

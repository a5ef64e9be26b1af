//! Transaction-count attestation encoding.
//!
//! Layout (84 bytes): account (20) ‖ count as uint256 (32) ‖ nonce (32).

use pulse_types::{ClaimDigest, CountAttestation, U256};

use crate::claim::digest;

/// Size of an encoded count attestation.
pub const ATTESTATION_ENCODED_LEN: usize = 20 + 32 + 32;

/// Encode a count attestation into its canonical byte layout.
pub fn encode_attestation(attestation: &CountAttestation) -> [u8; ATTESTATION_ENCODED_LEN] {
    let mut out = [0u8; ATTESTATION_ENCODED_LEN];
    out[..20].copy_from_slice(attestation.account.as_bytes());
    out[20..52].copy_from_slice(&U256::from(attestation.count).to_big_endian());
    out[52..].copy_from_slice(&attestation.nonce.to_big_endian());
    out
}

/// `digest(encode_attestation(attestation))`.
pub fn attestation_digest(attestation: &CountAttestation) -> ClaimDigest {
    digest(&encode_attestation(attestation))
}

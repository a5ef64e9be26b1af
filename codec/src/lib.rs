//! Claim Message Codec.
//!
//! Every party that touches a claim (signing authority, claimant, verifier)
//! must derive byte-identical output from the same logical request, so the
//! encoding is positional and fixed-width: addresses are 20 raw bytes,
//! integers are 32-byte big-endian words, no length prefixes, no reordering.
//! This is the layout of Solidity's `abi.encodePacked(address, uint256,
//! address, uint256)`; the digest is Keccak-256 over it.

pub mod attestation;
pub mod claim;
pub mod http;
pub mod wire;

pub use attestation::{attestation_digest, encode_attestation, ATTESTATION_ENCODED_LEN};
pub use claim::{claim_digest, decode, digest, encode, CLAIM_ENCODED_LEN};
pub use http::{ErrorBody, SignClaimBody, SignClaimResponse};
pub use wire::{WireClaimRequest, WireCountAttestation};

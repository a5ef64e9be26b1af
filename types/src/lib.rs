//! Fundamental types for the PulseWallet claim protocol.
//!
//! This crate defines the types shared by every other crate in the workspace:
//! accounts, 256-bit amounts and nonces, claim digests, signatures, the claim
//! request/authorization records, and the protocol error taxonomy.

pub mod address;
pub mod amount;
pub mod claim;
pub mod error;
pub mod hash;
pub mod keys;

pub use address::Account;
pub use amount::{Amount, Nonce, U256};
pub use claim::{
    ClaimAuthorization, ClaimRequest, ClaimSubmission, CountAttestation, EligibilityEstimate,
    SignedCountAttestation,
};
pub use error::{ClaimError, Signer};
pub use hash::ClaimDigest;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};

//! Signing authority for the PulseWallet claim protocol.
//!
//! A stateless oracle plus one long-lived secret: it reads the chain,
//! applies an [`EligibilityPolicy`], picks a fresh per-account nonce and
//! countersigns the resulting claim request.

pub mod authority;
pub mod client;
pub mod nonce;
pub mod policy;

pub use authority::SigningAuthority;
pub use client::AuthorityClient;
pub use nonce::NonceIssuer;
pub use policy::{EligibilityPolicy, PerTransaction, VerifierClaimable};

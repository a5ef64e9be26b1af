//! Claim verifier model.
//!
//! A deterministic state machine that admits a claim only if:
//! 1. the account has not already claimed,
//! 2. the `(account, nonce)` pair has not been consumed,
//! 3. the authority signature recovers to the authority account,
//! 4. the claimant signature recovers to the claiming account,
//! 5. the amount is non-zero.
//!
//! Acceptance is all-or-nothing: a rejected claim leaves the state untouched.
//! [`SharedVerifier`] wraps the state so that "check not claimed" and "mark
//! claimed" happen under one lock.

pub mod params;
pub mod shared;
pub mod state;
pub mod verify;

pub use params::VerifierParams;
pub use shared::SharedVerifier;
pub use state::VerifierState;
pub use verify::{record_transaction_count, verify, ClaimAccepted};

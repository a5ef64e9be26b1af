//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the claim protocol (clock, chain reads,
//! claim submission, the signing authority, session storage) sits behind a
//! trait. This crate provides implementations that:
//! - Return deterministic values
//! - Can be scripted to fail, stall, or answer out of order
//! - Record what was asked of them for assertions
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod authority;
pub mod chain;
pub mod clock;
pub mod session;

pub use authority::ScriptedAuthority;
pub use chain::{NullChainReader, NullClaimSubmitter, SubmitScript};
pub use clock::NullClock;
pub use session::NullSessionStore;

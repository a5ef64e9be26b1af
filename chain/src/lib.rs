//! Chain client collaborators for the PulseWallet claim protocol.
//!
//! - [`ChainReader`] / [`ClaimSubmitter`]: the reads and the one write the
//!   protocol needs from the network
//! - [`ExplorerClient`]: Etherscan-style explorer API over HTTP
//! - [`LocalChain`]: in-process chain wrapping the verifier model

pub mod client;
pub mod error;
pub mod explorer;
pub mod local;

pub use client::{ChainReader, ClaimReceipt, ClaimSubmitter};
pub use error::ChainError;
pub use explorer::ExplorerClient;
pub use local::LocalChain;

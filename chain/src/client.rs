//! Chain collaborator interfaces.
//!
//! Everything the claim protocol needs from the network goes through these
//! two traits: reads for eligibility and status, and the single claim
//! transaction. Implementations are best-effort; callers wrap reads in the
//! resilient query layer.

use async_trait::async_trait;
use pulse_types::{Account, Amount, ClaimSubmission};
use serde::{Deserialize, Serialize};

use crate::error::ChainError;

/// Read-only view of chain and verifier state.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Latest block height.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Transactions sent or received by `account` up to and including `block`.
    async fn transaction_count(&self, account: &Account, block: u64) -> Result<u64, ChainError>;

    /// Claim-token balance of `account`.
    async fn token_balance(&self, account: &Account) -> Result<Amount, ChainError>;

    /// Whether the verifier has marked `account` claimed.
    async fn has_claimed(&self, account: &Account) -> Result<bool, ChainError>;

    /// The verifier's own view of what `account` may claim.
    async fn claimable_amount(&self, account: &Account) -> Result<Amount, ChainError>;
}

/// Where claims are sent.
#[async_trait]
pub trait ClaimSubmitter: Send + Sync {
    /// Submit one claim. Irrevocable once sent; a [`ChainError::Timeout`]
    /// means the outcome is unknown.
    async fn submit_claim(&self, submission: &ClaimSubmission) -> Result<ClaimReceipt, ChainError>;
}

/// Proof that the verifier accepted a claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    #[serde(with = "pulse_types::amount::decimal")]
    pub amount: Amount,
}

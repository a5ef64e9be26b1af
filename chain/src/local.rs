//! In-process chain backed by the verifier model.
//!
//! Holds a block height, per-account transaction history, and a
//! [`SharedVerifier`]. Used by the daemon's local mode and by scenario tests.

use async_trait::async_trait;
use pulse_codec::claim_digest;
use pulse_types::{Account, Amount, ClaimSubmission, SignedCountAttestation};
use pulse_verifier::{SharedVerifier, VerifierParams, VerifierState};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use crate::client::{ChainReader, ClaimReceipt, ClaimSubmitter};
use crate::error::ChainError;

#[derive(Default)]
struct History {
    block: u64,
    /// Block height of every transaction, per account.
    transactions: HashMap<Account, Vec<u64>>,
}

pub struct LocalChain {
    verifier: SharedVerifier,
    history: Mutex<History>,
}

impl LocalChain {
    pub fn new(params: VerifierParams) -> Self {
        Self::with_state(params, VerifierState::new())
    }

    pub fn with_state(params: VerifierParams, state: VerifierState) -> Self {
        Self {
            verifier: SharedVerifier::with_state(params, state),
            history: Mutex::new(History::default()),
        }
    }

    pub fn verifier(&self) -> &SharedVerifier {
        &self.verifier
    }

    fn history(&self) -> std::sync::MutexGuard<'_, History> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `count` transactions for `account` in a new block.
    pub fn record_transactions(&self, account: Account, count: u64) -> u64 {
        let mut history = self.history();
        history.block += 1;
        let block = history.block;
        history
            .transactions
            .entry(account)
            .or_default()
            .extend(std::iter::repeat(block).take(count as usize));
        block
    }

    /// Advance the chain by one empty block.
    pub fn mine_block(&self) -> u64 {
        let mut history = self.history();
        history.block += 1;
        history.block
    }

    /// Submit an authority-signed transaction count to the verifier.
    pub fn submit_count_attestation(
        &self,
        signed: &SignedCountAttestation,
    ) -> Result<(), ChainError> {
        self.verifier
            .record_transaction_count(signed)
            .map_err(ChainError::Rejected)
    }
}

#[async_trait]
impl ChainReader for LocalChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.history().block)
    }

    async fn transaction_count(&self, account: &Account, block: u64) -> Result<u64, ChainError> {
        let history = self.history();
        Ok(history
            .transactions
            .get(account)
            .map(|blocks| blocks.iter().filter(|b| **b <= block).count() as u64)
            .unwrap_or(0))
    }

    async fn token_balance(&self, account: &Account) -> Result<Amount, ChainError> {
        Ok(self.verifier.balance_of(account))
    }

    async fn has_claimed(&self, account: &Account) -> Result<bool, ChainError> {
        Ok(self.verifier.has_claimed(account))
    }

    async fn claimable_amount(&self, account: &Account) -> Result<Amount, ChainError> {
        Ok(self.verifier.claimable_amount(account))
    }
}

#[async_trait]
impl ClaimSubmitter for LocalChain {
    async fn submit_claim(&self, submission: &ClaimSubmission) -> Result<ClaimReceipt, ChainError> {
        let accepted = self
            .verifier
            .submit_claim(submission)
            .map_err(ChainError::Rejected)?;
        let block = self.record_transactions(accepted.account, 1);
        info!(account = %accepted.account, block, "claim included");
        Ok(ClaimReceipt {
            transaction_hash: claim_digest(&submission.request).to_string(),
            block_number: block,
            amount: accepted.amount,
        })
    }
}

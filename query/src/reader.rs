//! Chain reads wrapped in the retry policy.

use pulse_chain::ChainReader;
use pulse_types::{Account, Amount, EligibilityEstimate, U256};
use std::sync::Arc;

use crate::error::QueryError;
use crate::retry::{with_retry, RetryPolicy};

/// A [`ChainReader`] whose every call goes through [`with_retry`].
#[derive(Clone)]
pub struct ResilientReader {
    inner: Arc<dyn ChainReader>,
    policy: RetryPolicy,
}

impl ResilientReader {
    pub fn new(inner: Arc<dyn ChainReader>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn block_number(&self) -> Result<u64, QueryError> {
        with_retry(&self.policy, "block_number", || self.inner.block_number()).await
    }

    pub async fn transaction_count(&self, account: &Account, block: u64) -> Result<u64, QueryError> {
        with_retry(&self.policy, "transaction_count", || {
            self.inner.transaction_count(account, block)
        })
        .await
    }

    pub async fn token_balance(&self, account: &Account) -> Result<Amount, QueryError> {
        with_retry(&self.policy, "token_balance", || self.inner.token_balance(account)).await
    }

    pub async fn has_claimed(&self, account: &Account) -> Result<bool, QueryError> {
        with_retry(&self.policy, "has_claimed", || self.inner.has_claimed(account)).await
    }

    pub async fn claimable_amount(&self, account: &Account) -> Result<Amount, QueryError> {
        with_retry(&self.policy, "claimable_amount", || {
            self.inner.claimable_amount(account)
        })
        .await
    }

    /// Advisory estimate: transaction count at the latest block times the unit.
    pub async fn eligibility_estimate(
        &self,
        account: &Account,
        units_per_transaction: Amount,
    ) -> Result<EligibilityEstimate, QueryError> {
        let block = self.block_number().await?;
        let count = self.transaction_count(account, block).await?;
        Ok(EligibilityEstimate {
            account: *account,
            transaction_count: count,
            claimable_amount: U256::from(count).saturating_mul(units_per_transaction),
        })
    }
}

//! Eligibility rules.
//!
//! A policy turns chain state into a claimable amount. It must depend only
//! on what the chain says (pinned to a block height where the rule allows),
//! never on request time, so two concurrent requests for one account agree.

use async_trait::async_trait;
use pulse_query::{QueryError, ResilientReader};
use pulse_types::{Account, Amount, U256};

#[async_trait]
pub trait EligibilityPolicy: Send + Sync {
    /// Claimable amount for `account` as of `block`.
    async fn claimable(
        &self,
        reader: &ResilientReader,
        account: &Account,
        block: u64,
    ) -> Result<Amount, QueryError>;

    fn name(&self) -> &'static str;
}

/// A fixed number of units for every historical transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerTransaction {
    pub units_per_transaction: Amount,
}

impl PerTransaction {
    pub fn new(units_per_transaction: Amount) -> Self {
        Self {
            units_per_transaction,
        }
    }

    pub fn amount_for(&self, transaction_count: u64) -> Amount {
        U256::from(transaction_count).saturating_mul(self.units_per_transaction)
    }
}

#[async_trait]
impl EligibilityPolicy for PerTransaction {
    async fn claimable(
        &self,
        reader: &ResilientReader,
        account: &Account,
        block: u64,
    ) -> Result<Amount, QueryError> {
        let count = reader.transaction_count(account, block).await?;
        Ok(self.amount_for(count))
    }

    fn name(&self) -> &'static str {
        "per_transaction"
    }
}

/// Defer to the verifier's own `claimable_amount`, which is derived from
/// previously attested transaction counts. Reads the latest verifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerifierClaimable;

#[async_trait]
impl EligibilityPolicy for VerifierClaimable {
    async fn claimable(
        &self,
        reader: &ResilientReader,
        account: &Account,
        _block: u64,
    ) -> Result<Amount, QueryError> {
        reader.claimable_amount(account).await
    }

    fn name(&self) -> &'static str {
        "verifier_claimable"
    }
}

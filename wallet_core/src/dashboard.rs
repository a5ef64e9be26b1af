//! Read-only account overview.

use pulse_query::{Observed, ResilientReader};
use pulse_types::{Account, Amount, EligibilityEstimate};
use serde::Serialize;

/// Everything the wallet shows about one account. Each field is read
/// independently; one failing source leaves only that field unknown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub account: Account,
    pub token_balance: Observed<Amount>,
    pub transaction_count: Observed<u64>,
    pub estimate: Observed<EligibilityEstimate>,
    pub claimed: Observed<bool>,
}

impl DashboardSnapshot {
    pub async fn collect(
        reader: &ResilientReader,
        account: &Account,
        units_per_transaction: Amount,
    ) -> Self {
        let (token_balance, estimate, claimed) = tokio::join!(
            reader.token_balance(account),
            reader.eligibility_estimate(account, units_per_transaction),
            reader.has_claimed(account),
        );
        let estimate: Observed<EligibilityEstimate> = estimate.into();
        Self {
            account: *account,
            token_balance: token_balance.into(),
            transaction_count: estimate.clone().map(|e| e.transaction_count),
            estimate,
            claimed: claimed.into(),
        }
    }

    /// Whether offering the claim action makes sense.
    ///
    /// Unknown claim status or eligibility still allows an attempt; the
    /// authority has the final word.
    pub fn may_claim(&self) -> bool {
        let claimed = matches!(self.claimed, Observed::Known { value: true });
        let nothing = matches!(
            &self.estimate,
            Observed::Known { value } if value.claimable_amount.is_zero()
        );
        !claimed && !nothing
    }
}

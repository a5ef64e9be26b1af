//! Verifier deployment parameters.

use pulse_types::{Account, Amount, U256};
use serde::{Deserialize, Serialize};

/// Referral bonus paid to the referrer, in basis points of the claimed amount (10%).
pub const DEFAULT_REFERRAL_BPS: u32 = 1_000;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fixed at deployment; never mutated by claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierParams {
    /// Account whose signature authorizes claims and count attestations.
    pub authority: Account,
    /// Claimable amount per attested transaction.
    #[serde(with = "pulse_types::amount::decimal")]
    pub units_per_transaction: Amount,
    /// Referral bonus in basis points.
    pub referral_bps: u32,
}

impl VerifierParams {
    pub fn new(authority: Account, units_per_transaction: Amount) -> Self {
        Self {
            authority,
            units_per_transaction,
            referral_bps: DEFAULT_REFERRAL_BPS,
        }
    }

    /// Referral bonus owed on a claim of `amount`.
    pub fn referral_bonus(&self, amount: Amount) -> Amount {
        amount.saturating_mul(U256::from(self.referral_bps)) / U256::from(BPS_DENOMINATOR)
    }
}

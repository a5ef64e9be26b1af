//! Verifier persistent state.

use pulse_types::{Account, Amount, Nonce, U256};
use std::collections::{HashMap, HashSet};

use crate::params::VerifierParams;

/// Everything the verifier remembers between calls.
///
/// `claimed` is the claim record: created empty, an account enters it exactly
/// once (on its first accepted claim) and never leaves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifierState {
    pub(crate) claimed: HashSet<Account>,
    pub(crate) consumed_nonces: HashSet<(Account, Nonce)>,
    pub(crate) transaction_counts: HashMap<Account, u64>,
    pub(crate) balances: HashMap<Account, Amount>,
    pub(crate) referral_earnings: HashMap<Account, Amount>,
    pub(crate) referred_users: HashMap<Account, Vec<Account>>,
}

impl VerifierState {
    /// Fresh deployment state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_claimed(&self, account: &Account) -> bool {
        self.claimed.contains(account)
    }

    pub fn is_nonce_consumed(&self, account: &Account, nonce: &Nonce) -> bool {
        self.consumed_nonces.contains(&(*account, *nonce))
    }

    /// Last attested transaction count for `account` (zero if never attested).
    pub fn transaction_count(&self, account: &Account) -> u64 {
        self.transaction_counts.get(account).copied().unwrap_or(0)
    }

    /// Token balance credited by claims and referral bonuses.
    pub fn balance_of(&self, account: &Account) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// What the account could claim right now: attested count times the unit, zero once claimed.
    pub fn claimable_amount(&self, account: &Account, params: &VerifierParams) -> Amount {
        if self.has_claimed(account) {
            return U256::zero();
        }
        U256::from(self.transaction_count(account)).saturating_mul(params.units_per_transaction)
    }

    pub fn referral_earnings(&self, referrer: &Account) -> Amount {
        self.referral_earnings
            .get(referrer)
            .copied()
            .unwrap_or_default()
    }

    pub fn referred_users(&self, referrer: &Account) -> &[Account] {
        self.referred_users
            .get(referrer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of accounts that have claimed.
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }
}

//! Thread-safe verifier handle.

use std::sync::{Mutex, MutexGuard};

use pulse_types::{Account, Amount, ClaimError, ClaimSubmission, SignedCountAttestation};

use crate::params::VerifierParams;
use crate::state::VerifierState;
use crate::verify::{record_transaction_count, verify, ClaimAccepted};

/// A verifier shared between concurrent submitters.
///
/// Each call runs the pure transition and commits its result while holding
/// one lock, so "not yet claimed" and "mark claimed" are a single step.
pub struct SharedVerifier {
    params: VerifierParams,
    state: Mutex<VerifierState>,
}

impl SharedVerifier {
    pub fn new(params: VerifierParams) -> Self {
        Self::with_state(params, VerifierState::new())
    }

    pub fn with_state(params: VerifierParams, state: VerifierState) -> Self {
        Self {
            params,
            state: Mutex::new(state),
        }
    }

    pub fn params(&self) -> &VerifierParams {
        &self.params
    }

    // Transitions commit by whole-value swap; a poisoned guard still holds a consistent state.
    fn lock(&self) -> MutexGuard<'_, VerifierState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn submit_claim(&self, submission: &ClaimSubmission) -> Result<ClaimAccepted, ClaimError> {
        let mut state = self.lock();
        let (next, result) = verify(
            &state,
            &self.params,
            &submission.request,
            &submission.authority_sig,
            &submission.claimant_sig,
        );
        if result.is_ok() {
            *state = next;
        }
        result
    }

    pub fn record_transaction_count(
        &self,
        signed: &SignedCountAttestation,
    ) -> Result<(), ClaimError> {
        let mut state = self.lock();
        let (next, result) = record_transaction_count(&state, &self.params, signed);
        if result.is_ok() {
            *state = next;
        }
        result
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> VerifierState {
        self.lock().clone()
    }

    pub fn has_claimed(&self, account: &Account) -> bool {
        self.lock().has_claimed(account)
    }

    pub fn balance_of(&self, account: &Account) -> Amount {
        self.lock().balance_of(account)
    }

    pub fn transaction_count(&self, account: &Account) -> u64 {
        self.lock().transaction_count(account)
    }

    pub fn claimable_amount(&self, account: &Account) -> Amount {
        self.lock().claimable_amount(account, &self.params)
    }

    pub fn referral_earnings(&self, referrer: &Account) -> Amount {
        self.lock().referral_earnings(referrer)
    }

    pub fn referred_users(&self, referrer: &Account) -> Vec<Account> {
        self.lock().referred_users(referrer).to_vec()
    }
}

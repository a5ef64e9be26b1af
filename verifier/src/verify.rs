//! Pure verification transitions.
//!
//! Both entry points take the current state by reference and return the next
//! state alongside the outcome. On rejection the returned state is an
//! unchanged copy of the input.

use pulse_codec::{attestation_digest, claim_digest};
use pulse_crypto::verify_signer;
use pulse_types::{
    Account, Amount, ClaimError, ClaimRequest, SignedCountAttestation, Signer, U256,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::params::VerifierParams;
use crate::state::VerifierState;

/// What an accepted claim did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAccepted {
    pub account: Account,
    #[serde(with = "pulse_types::amount::decimal")]
    pub amount: Amount,
    pub referrer: Option<Account>,
    /// Bonus credited to `referrer`; zero when there is none.
    #[serde(with = "pulse_types::amount::decimal")]
    pub referral_bonus: Amount,
}

/// Check a claim against `state` and apply it if every condition holds.
pub fn verify(
    state: &VerifierState,
    params: &VerifierParams,
    request: &ClaimRequest,
    authority_sig: &[u8],
    claimant_sig: &[u8],
) -> (VerifierState, Result<ClaimAccepted, ClaimError>) {
    match check_and_apply(state, params, request, authority_sig, claimant_sig) {
        Ok((next, accepted)) => (next, Ok(accepted)),
        Err(e) => {
            debug!(account = %request.account, reason = e.reason(), "claim rejected");
            (state.clone(), Err(e))
        }
    }
}

fn check_and_apply(
    state: &VerifierState,
    params: &VerifierParams,
    request: &ClaimRequest,
    authority_sig: &[u8],
    claimant_sig: &[u8],
) -> Result<(VerifierState, ClaimAccepted), ClaimError> {
    let account = request.account;
    if state.has_claimed(&account) {
        return Err(ClaimError::AlreadyClaimed);
    }
    if state.is_nonce_consumed(&account, &request.nonce) {
        return Err(ClaimError::StaleOrConsumedNonce);
    }

    let digest = claim_digest(request);
    if !verify_signer(&digest, authority_sig, &params.authority) {
        return Err(ClaimError::InvalidSignature {
            signer: Signer::Authority,
        });
    }
    if !verify_signer(&digest, claimant_sig, &account) {
        return Err(ClaimError::InvalidSignature {
            signer: Signer::Claimant,
        });
    }
    if request.amount.is_zero() {
        return Err(ClaimError::ZeroAmount);
    }

    let referrer = request.referrer().filter(|r| *r != account);
    let referral_bonus = match referrer {
        Some(_) => params.referral_bonus(request.amount),
        None => U256::zero(),
    };

    // Compute every new value before touching the copy so overflow rejects cleanly.
    let new_balance = credit(state.balance_of(&account), request.amount)?;
    let referrer_update = match referrer {
        Some(r) => Some((
            r,
            credit(state.balance_of(&r), referral_bonus)?,
            credit(state.referral_earnings(&r), referral_bonus)?,
        )),
        None => None,
    };

    let mut next = state.clone();
    next.claimed.insert(account);
    next.consumed_nonces.insert((account, request.nonce));
    next.balances.insert(account, new_balance);
    if let Some((r, balance, earnings)) = referrer_update {
        next.balances.insert(r, balance);
        next.referral_earnings.insert(r, earnings);
        next.referred_users.entry(r).or_default().push(account);
    }

    info!(
        account = %account,
        amount = %request.amount,
        nonce = %request.nonce,
        "claim accepted"
    );
    Ok((
        next,
        ClaimAccepted {
            account,
            amount: request.amount,
            referrer,
            referral_bonus,
        },
    ))
}

fn credit(balance: Amount, amount: Amount) -> Result<Amount, ClaimError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| ClaimError::Internal("balance overflow".into()))
}

/// Record an authority-attested transaction count.
///
/// Consumes the attestation's nonce in the account's nonce space, so a claim
/// authorization carrying the same nonce becomes unusable.
pub fn record_transaction_count(
    state: &VerifierState,
    params: &VerifierParams,
    signed: &SignedCountAttestation,
) -> (VerifierState, Result<(), ClaimError>) {
    let att = &signed.attestation;
    if state.is_nonce_consumed(&att.account, &att.nonce) {
        return (state.clone(), Err(ClaimError::StaleOrConsumedNonce));
    }
    let digest = attestation_digest(att);
    if !verify_signer(&digest, signed.authority_sig.as_bytes(), &params.authority) {
        return (
            state.clone(),
            Err(ClaimError::InvalidSignature {
                signer: Signer::Authority,
            }),
        );
    }

    let mut next = state.clone();
    next.consumed_nonces.insert((att.account, att.nonce));
    next.transaction_counts.insert(att.account, att.count);
    debug!(account = %att.account, count = att.count, "transaction count recorded");
    (next, Ok(()))
}

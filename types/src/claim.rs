//! Claim request, authorization and submission records.

use serde::{Deserialize, Serialize};

use crate::address::Account;
use crate::amount::{Amount, Nonce};
use crate::keys::Signature;

/// The four fields every party signs over, in canonical order.
///
/// `referrer` uses [`Account::ZERO`] as the "no referrer" sentinel so the
/// encoded layout stays fixed-width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub account: Account,
    #[serde(with = "crate::amount::decimal")]
    pub amount: Amount,
    pub referrer: Account,
    #[serde(with = "crate::amount::decimal")]
    pub nonce: Nonce,
}

impl ClaimRequest {
    pub fn new(account: Account, amount: Amount, referrer: Option<Account>, nonce: Nonce) -> Self {
        Self {
            account,
            amount,
            referrer: referrer.unwrap_or(Account::ZERO),
            nonce,
        }
    }

    /// The referrer, if one was named.
    pub fn referrer(&self) -> Option<Account> {
        self.referrer.non_zero()
    }
}

/// A claim request countersigned by the signing authority.
///
/// Possessing one proves the authority attested to this exact amount and
/// nonce for this account. It still needs the account's own signature before
/// the verifier will accept it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAuthorization {
    pub request: ClaimRequest,
    pub authority_sig: Signature,
}

/// Everything the verifier receives in one claim call.
///
/// Signatures are raw bytes, as the on-chain entry point takes them; the
/// verifier rejects anything that is not a well-formed 65-byte signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub request: ClaimRequest,
    pub authority_sig: Vec<u8>,
    pub claimant_sig: Vec<u8>,
}

impl ClaimSubmission {
    pub fn new(authorization: &ClaimAuthorization, claimant_sig: &Signature) -> Self {
        Self {
            request: authorization.request,
            authority_sig: authorization.authority_sig.to_vec(),
            claimant_sig: claimant_sig.to_vec(),
        }
    }
}

/// The authority's statement that `account` had `count` transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountAttestation {
    pub account: Account,
    pub count: u64,
    #[serde(with = "crate::amount::decimal")]
    pub nonce: Nonce,
}

/// A [`CountAttestation`] with the authority's signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCountAttestation {
    pub attestation: CountAttestation,
    pub authority_sig: Signature,
}

/// Advisory projection of what an account could claim.
///
/// Computed from a possibly stale transaction count; the authoritative amount
/// is whatever the signing authority attests to at claim time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityEstimate {
    pub account: Account,
    pub transaction_count: u64,
    #[serde(with = "crate::amount::decimal")]
    pub claimable_amount: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::U256;

    #[test]
    fn missing_referrer_becomes_zero_sentinel() {
        let req = ClaimRequest::new(Account::new([1; 20]), U256::from(5u64), None, U256::one());
        assert!(req.referrer.is_zero());
        assert_eq!(req.referrer(), None);
    }

    #[test]
    fn request_json_uses_decimal_strings() {
        let req = ClaimRequest::new(
            Account::new([1; 20]),
            U256::from(5_000u64),
            Some(Account::new([2; 20])),
            U256::from(42u64),
        );
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["amount"], "5000");
        assert_eq!(json["nonce"], "42");
        let back: ClaimRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, req);
    }
}

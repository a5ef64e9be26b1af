//! JSON bodies of the authority's `sign-claim` endpoint.
//!
//! Shared by the server and the HTTP client so both sides agree on field
//! names and on how reason codes map back to [`ClaimError`].

use pulse_types::{
    amount, Account, ClaimAuthorization, ClaimDigest, ClaimError, ClaimRequest, Signature,
};
use serde::{Deserialize, Serialize};

use crate::claim::claim_digest;

/// `POST /api/wallet/sign-claim` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignClaimBody {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

impl SignClaimBody {
    pub fn new(account: &Account, referrer: Option<Account>) -> Self {
        Self {
            address: account.to_string(),
            referrer: referrer.map(|r| r.to_string()),
        }
    }

    /// The claiming account. A malformed or zero address is `InvalidAddress`.
    pub fn account(&self) -> Result<Account, ClaimError> {
        match self.address.trim().parse::<Account>() {
            Ok(account) if !account.is_zero() => Ok(account),
            _ => Err(ClaimError::InvalidAddress(self.address.clone())),
        }
    }

    /// The referrer. Anything that is not a valid non-zero address means "none".
    pub fn referrer(&self) -> Option<Account> {
        self.referrer
            .as_deref()
            .and_then(|r| r.trim().parse::<Account>().ok())
            .and_then(Account::non_zero)
    }
}

/// Successful `sign-claim` response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignClaimResponse {
    /// Decimal string.
    pub amount: String,
    /// Decimal string.
    pub nonce: String,
    pub authority_sig: String,
    pub message_hash: String,
}

impl SignClaimResponse {
    pub fn from_authorization(auth: &ClaimAuthorization) -> Self {
        Self {
            amount: auth.request.amount.to_string(),
            nonce: auth.request.nonce.to_string(),
            authority_sig: auth.authority_sig.to_string(),
            message_hash: claim_digest(&auth.request).to_string(),
        }
    }

    /// Rebuild the authorization for the request the caller sent.
    ///
    /// The advertised `messageHash` must equal the digest recomputed locally
    /// from `(account, amount, referrer, nonce)`; a mismatch means the two
    /// sides disagree on the request and is reported as `InvalidField`.
    pub fn into_authorization(
        self,
        account: Account,
        referrer: Option<Account>,
    ) -> Result<ClaimAuthorization, ClaimError> {
        let request = ClaimRequest::new(
            account,
            amount::parse_decimal(&self.amount, "amount")?,
            referrer,
            amount::parse_decimal(&self.nonce, "nonce")?,
        );
        let advertised = ClaimDigest::from_hex(&self.message_hash)?;
        if advertised != claim_digest(&request) {
            return Err(ClaimError::InvalidField {
                field: "messageHash",
                reason: "does not match the locally computed claim digest".into(),
            });
        }
        Ok(ClaimAuthorization {
            request,
            authority_sig: Signature::from_hex(&self.authority_sig)?,
        })
    }
}

/// Error response body: a stable reason code plus a human message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub reason: String,
    pub message: String,
}

impl ErrorBody {
    pub fn from_error(e: &ClaimError) -> Self {
        Self {
            reason: e.reason().to_string(),
            message: e.to_string(),
        }
    }

    /// Map a reason code received over the wire back to the taxonomy.
    pub fn into_error(self) -> ClaimError {
        match self.reason.as_str() {
            "already_claimed" => ClaimError::AlreadyClaimed,
            "nothing_to_claim" => ClaimError::NothingToClaim,
            "zero_amount" => ClaimError::ZeroAmount,
            "stale_or_consumed_nonce" => ClaimError::StaleOrConsumedNonce,
            "invalid_address" => ClaimError::InvalidAddress(self.message),
            "query_failed" => ClaimError::Query(self.message),
            "network_timeout" => ClaimError::NetworkTimeout,
            _ => ClaimError::Internal(self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_types::U256;

    fn authorization() -> ClaimAuthorization {
        ClaimAuthorization {
            request: ClaimRequest::new(
                Account::new([1; 20]),
                U256::from(5u64),
                Some(Account::new([2; 20])),
                U256::from(1_700_000_000_000u64),
            ),
            authority_sig: Signature([7; 65]),
        }
    }

    #[test]
    fn response_uses_camel_case_names() {
        let json = serde_json::to_value(SignClaimResponse::from_authorization(&authorization()))
            .unwrap();
        assert_eq!(json["amount"], "5");
        assert_eq!(json["nonce"], "1700000000000");
        assert!(json["authoritySig"].as_str().unwrap().starts_with("0x0707"));
        assert!(json.get("messageHash").is_some());
    }

    #[test]
    fn response_rebuilds_the_same_authorization() {
        let auth = authorization();
        let rebuilt = SignClaimResponse::from_authorization(&auth)
            .into_authorization(auth.request.account, auth.request.referrer())
            .unwrap();
        assert_eq!(rebuilt, auth);
    }

    #[test]
    fn referrer_disagreement_is_caught_by_message_hash() {
        let auth = authorization();
        let err = SignClaimResponse::from_authorization(&auth)
            .into_authorization(auth.request.account, None)
            .unwrap_err();
        assert!(matches!(err, ClaimError::InvalidField { field: "messageHash", .. }));
    }

    #[test]
    fn invalid_referrer_is_ignored_but_invalid_address_is_not() {
        let body = SignClaimBody {
            address: "not-an-address".into(),
            referrer: Some("0x1234".into()),
        };
        assert!(matches!(body.account(), Err(ClaimError::InvalidAddress(_))));
        assert_eq!(body.referrer(), None);
    }

    #[test]
    fn reason_codes_map_back() {
        for e in [
            ClaimError::AlreadyClaimed,
            ClaimError::NothingToClaim,
            ClaimError::NetworkTimeout,
        ] {
            assert_eq!(ErrorBody::from_error(&e).into_error(), e);
        }
        let body = ErrorBody {
            reason: "something_new".into(),
            message: "boom".into(),
        };
        assert_eq!(body.into_error(), ClaimError::Internal("boom".into()));
    }
}

//! Text forms of claim messages as they travel over JSON.
//!
//! Amounts and nonces are decimal strings (they do not fit in a JSON number),
//! addresses are hex. Parsing is where malformed fields are caught: a value
//! past 256 bits or an address that is not 20 bytes is an `InvalidField`,
//! never truncated.

use pulse_types::{amount, Account, ClaimError, ClaimRequest, CountAttestation};
use serde::{Deserialize, Serialize};

/// Untyped claim request fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireClaimRequest {
    pub account: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    pub nonce: String,
}

impl WireClaimRequest {
    pub fn parse(&self) -> Result<ClaimRequest, ClaimError> {
        let referrer = match self.referrer.as_deref() {
            None | Some("") => None,
            Some(s) => Account::parse_field(s, "referrer")?.non_zero(),
        };
        Ok(ClaimRequest::new(
            Account::parse_field(&self.account, "account")?,
            amount::parse_decimal(&self.amount, "amount")?,
            referrer,
            amount::parse_decimal(&self.nonce, "nonce")?,
        ))
    }
}

impl From<&ClaimRequest> for WireClaimRequest {
    fn from(request: &ClaimRequest) -> Self {
        Self {
            account: request.account.to_string(),
            amount: request.amount.to_string(),
            referrer: request.referrer().map(|r| r.to_string()),
            nonce: request.nonce.to_string(),
        }
    }
}

/// Untyped count attestation fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCountAttestation {
    pub account: String,
    pub count: u64,
    pub nonce: String,
}

impl WireCountAttestation {
    pub fn parse(&self) -> Result<CountAttestation, ClaimError> {
        Ok(CountAttestation {
            account: Account::parse_field(&self.account, "account")?,
            count: self.count,
            nonce: amount::parse_decimal(&self.nonce, "nonce")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_types::U256;

    fn wire() -> WireClaimRequest {
        WireClaimRequest {
            account: format!("0x{}", "ab".repeat(20)),
            amount: "5000000000000000000".into(),
            referrer: None,
            nonce: "1700000000000".into(),
        }
    }

    #[test]
    fn parses_valid_request() {
        let req = wire().parse().unwrap();
        assert_eq!(req.amount, U256::from(5_000_000_000_000_000_000u128));
        assert_eq!(req.referrer(), None);
        assert_eq!(WireClaimRequest::from(&req), wire());
    }

    #[test]
    fn oversized_amount_is_invalid_field() {
        let mut w = wire();
        w.amount = "9".repeat(80);
        assert!(matches!(
            w.parse(),
            Err(ClaimError::InvalidField { field: "amount", .. })
        ));
    }

    #[test]
    fn short_account_is_invalid_field() {
        let mut w = wire();
        w.account = "0xabcdef".into();
        assert!(matches!(
            w.parse(),
            Err(ClaimError::InvalidField { field: "account", .. })
        ));
    }

    #[test]
    fn malformed_referrer_is_reported_against_referrer() {
        let mut w = wire();
        w.referrer = Some("0x12".into());
        assert!(matches!(
            w.parse(),
            Err(ClaimError::InvalidField { field: "referrer", .. })
        ));
    }

    #[test]
    fn zero_referrer_means_none() {
        let mut w = wire();
        w.referrer = Some(format!("0x{}", "00".repeat(20)));
        assert_eq!(w.parse().unwrap().referrer(), None);
    }
}

//! Protocol error taxonomy shared across crates.

use std::fmt;
use thiserror::Error;

/// Which party's signature failed to validate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signer {
    Authority,
    Claimant,
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signer::Authority => write!(f, "authority"),
            Signer::Claimant => write!(f, "claimant"),
        }
    }
}

/// Every way a claim can fail, from encoding through on-chain verification.
///
/// Each variant maps to a stable machine-readable [`reason`](ClaimError::reason)
/// code so callers can surface a specific cause instead of a generic failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("account has already claimed")]
    AlreadyClaimed,

    #[error("no claimable tokens for this account")]
    NothingToClaim,

    #[error("claim amount must be non-zero")]
    ZeroAmount,

    #[error("{signer} signature does not match the claim")]
    InvalidSignature { signer: Signer },

    #[error("nonce is stale or already consumed for this account")]
    StaleOrConsumedNonce,

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("network timeout; outcome unknown, re-query claim status before retrying")]
    NetworkTimeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ClaimError {
    /// Stable snake_case reason code for machine consumers.
    pub fn reason(&self) -> &'static str {
        match self {
            ClaimError::AlreadyClaimed => "already_claimed",
            ClaimError::NothingToClaim => "nothing_to_claim",
            ClaimError::ZeroAmount => "zero_amount",
            ClaimError::InvalidSignature {
                signer: Signer::Authority,
            } => "invalid_authority_signature",
            ClaimError::InvalidSignature {
                signer: Signer::Claimant,
            } => "invalid_claimant_signature",
            ClaimError::StaleOrConsumedNonce => "stale_or_consumed_nonce",
            ClaimError::InvalidField { .. } => "invalid_field",
            ClaimError::InvalidAddress(_) => "invalid_address",
            ClaimError::Query(_) => "query_failed",
            ClaimError::NetworkTimeout => "network_timeout",
            ClaimError::Internal(_) => "internal_error",
        }
    }

    /// Protocol-level rejections that cannot succeed on retry without a fresh authorization.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClaimError::AlreadyClaimed
                | ClaimError::NothingToClaim
                | ClaimError::ZeroAmount
                | ClaimError::InvalidSignature { .. }
                | ClaimError::StaleOrConsumedNonce
                | ClaimError::InvalidField { .. }
                | ClaimError::InvalidAddress(_)
        )
    }
}

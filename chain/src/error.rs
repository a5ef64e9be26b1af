use pulse_types::ClaimError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("request timed out")]
    Timeout,

    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The verifier refused the submitted claim.
    #[error("claim rejected: {0}")]
    Rejected(ClaimError),
}

impl ChainError {
    /// Worth another attempt: the same request might succeed later.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ChainError::Rejected(_))
    }
}

impl From<ChainError> for ClaimError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::Timeout => ClaimError::NetworkTimeout,
            ChainError::Rejected(reason) => reason,
            other => ClaimError::Query(other.to_string()),
        }
    }
}

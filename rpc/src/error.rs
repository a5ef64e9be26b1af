//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pulse_codec::ErrorBody;
use pulse_types::ClaimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authority key error: {0}")]
    Key(String),

    #[error("server error: {0}")]
    Server(String),
}

impl From<std::io::Error> for RpcError {
    fn from(e: std::io::Error) -> Self {
        RpcError::Server(e.to_string())
    }
}

/// A claim failure on its way out as an HTTP response.
///
/// Only `already_claimed`, `nothing_to_claim` and `invalid_address` are
/// client errors; everything else is reported as `internal_error`, with 503
/// when the cause was an upstream read that may succeed later.
#[derive(Debug)]
pub struct ApiError(pub ClaimError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ClaimError::AlreadyClaimed
            | ClaimError::NothingToClaim
            | ClaimError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ClaimError::Query(_) | ClaimError::NetworkTimeout => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        if self.status() == StatusCode::BAD_REQUEST {
            ErrorBody::from_error(&self.0)
        } else {
            ErrorBody {
                reason: "internal_error".to_string(),
                message: self.0.to_string(),
            }
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(e: ClaimError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_reason() {
        let e = ApiError(ClaimError::NothingToClaim);
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.body().reason, "nothing_to_claim");
    }

    #[test]
    fn upstream_failures_are_unavailable_internal_errors() {
        let e = ApiError(ClaimError::Query("explorer down".into()));
        assert_eq!(e.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.body().reason, "internal_error");
        assert!(e.body().message.contains("explorer down"));

        let e = ApiError(ClaimError::Internal("signing failed".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

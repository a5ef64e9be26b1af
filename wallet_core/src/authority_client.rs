//! HTTP client for a remote signing authority.

use async_trait::async_trait;
use pulse_authority::AuthorityClient;
use pulse_codec::{ErrorBody, SignClaimBody, SignClaimResponse};
use pulse_types::{Account, ClaimAuthorization, ClaimError};
use std::time::Duration;
use tracing::debug;

use crate::error::WalletError;

/// Path of the authorization endpoint, relative to the authority base URL.
pub const SIGN_CLAIM_PATH: &str = "/api/wallet/sign-claim";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct HttpAuthorityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthorityClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, WalletError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| WalletError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SIGN_CLAIM_PATH)
    }
}

fn map_transport_error(e: reqwest::Error) -> ClaimError {
    if e.is_timeout() {
        ClaimError::NetworkTimeout
    } else {
        ClaimError::Query(format!("authority request failed: {e}"))
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn request_authorization(
        &self,
        account: &Account,
        referrer: Option<Account>,
    ) -> Result<ClaimAuthorization, ClaimError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&SignClaimBody::new(account, referrer))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            let body: SignClaimResponse = response.json().await.map_err(|e| {
                ClaimError::Internal(format!("malformed authority response: {e}"))
            })?;
            let auth = body.into_authorization(*account, referrer)?;
            debug!(account = %account, nonce = %auth.request.nonce, "authorization received");
            return Ok(auth);
        }

        // Error responses carry a reason code; a body without one is still a failure with context.
        match response.json::<ErrorBody>().await {
            Ok(body) => Err(body.into_error()),
            Err(_) if status.is_server_error() => Err(ClaimError::Query(format!(
                "authority returned HTTP {status}"
            ))),
            Err(_) => Err(ClaimError::Internal(format!(
                "authority returned HTTP {status}"
            ))),
        }
    }
}

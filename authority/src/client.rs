//! The claimant-facing interface to a signing authority.

use async_trait::async_trait;
use pulse_types::{Account, ClaimAuthorization, ClaimError};

/// Anything that can hand out claim authorizations: the in-process
/// [`SigningAuthority`](crate::SigningAuthority) or a remote one over HTTP.
///
/// Failures carry the protocol reason (`AlreadyClaimed`, `NothingToClaim`,
/// `InvalidAddress`) or a transport error (`NetworkTimeout`, `Query`).
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    async fn request_authorization(
        &self,
        account: &Account,
        referrer: Option<Account>,
    ) -> Result<ClaimAuthorization, ClaimError>;
}

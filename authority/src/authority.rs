//! The signing authority service.

use async_trait::async_trait;
use pulse_codec::{attestation_digest, claim_digest};
use pulse_crypto::sign_digest;
use pulse_query::ResilientReader;
use pulse_types::{
    Account, Amount, ClaimAuthorization, ClaimError, ClaimRequest, CountAttestation, KeyPair,
    SignedCountAttestation,
};
use pulse_utils::Clock;
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::AuthorityClient;
use crate::nonce::NonceIssuer;
use crate::policy::EligibilityPolicy;

/// Holds the authority key and issues signed claim authorizations.
///
/// Keeps no claimed/unclaimed state of its own: every decision is read from
/// the chain, and the verifier is the only place a claim is committed.
/// Issuing twice for the same account yields two valid authorizations with
/// different nonces, of which the verifier will accept at most one.
pub struct SigningAuthority {
    keys: KeyPair,
    reader: ResilientReader,
    policy: Box<dyn EligibilityPolicy>,
    nonces: NonceIssuer,
}

impl SigningAuthority {
    pub fn new(
        keys: KeyPair,
        reader: ResilientReader,
        policy: Box<dyn EligibilityPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(authority = %keys.account, policy = policy.name(), "signing authority ready");
        Self {
            keys,
            reader,
            policy,
            nonces: NonceIssuer::new(clock),
        }
    }

    /// Account whose signatures the verifier trusts.
    pub fn account(&self) -> Account {
        self.keys.account
    }

    /// Claimable amount for `account` at the latest block.
    pub async fn compute_eligibility(&self, account: &Account) -> Result<Amount, ClaimError> {
        let block = self.reader.block_number().await?;
        let amount = self.policy.claimable(&self.reader, account, block).await?;
        debug!(account = %account, block, amount = %amount, "eligibility computed");
        Ok(amount)
    }

    /// Build and sign a claim authorization for `account`.
    pub async fn issue_authorization(
        &self,
        account: &Account,
        referrer: Option<Account>,
    ) -> Result<ClaimAuthorization, ClaimError> {
        if account.is_zero() {
            return Err(ClaimError::InvalidAddress(account.to_string()));
        }
        if self.reader.has_claimed(account).await? {
            return Err(ClaimError::AlreadyClaimed);
        }
        let amount = self.compute_eligibility(account).await?;
        if amount.is_zero() {
            return Err(ClaimError::NothingToClaim);
        }

        let nonce = self.nonces.next(account);
        let request = ClaimRequest::new(*account, amount, referrer, nonce);
        let authority_sig = sign_digest(&claim_digest(&request), &self.keys.private)
            .map_err(|e| ClaimError::Internal(e.to_string()))?;

        info!(
            account = %account,
            amount = %amount,
            nonce = %nonce,
            referred = referrer.is_some(),
            "claim authorized"
        );
        Ok(ClaimAuthorization {
            request,
            authority_sig,
        })
    }

    /// Sign the account's transaction count at the latest block, for the
    /// verifier's `record_transaction_count`.
    pub async fn attest_transaction_count(
        &self,
        account: &Account,
    ) -> Result<SignedCountAttestation, ClaimError> {
        let block = self.reader.block_number().await?;
        let count = self.reader.transaction_count(account, block).await?;
        let attestation = CountAttestation {
            account: *account,
            count,
            nonce: self.nonces.next(account),
        };
        let authority_sig = sign_digest(&attestation_digest(&attestation), &self.keys.private)
            .map_err(|e| ClaimError::Internal(e.to_string()))?;
        info!(account = %account, block, count, "transaction count attested");
        Ok(SignedCountAttestation {
            attestation,
            authority_sig,
        })
    }
}

#[async_trait]
impl AuthorityClient for SigningAuthority {
    async fn request_authorization(
        &self,
        account: &Account,
        referrer: Option<Account>,
    ) -> Result<ClaimAuthorization, ClaimError> {
        self.issue_authorization(account, referrer).await
    }
}

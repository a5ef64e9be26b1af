//! Claimant orchestrator.
//!
//! Drives one claim attempt through
//! `Idle → EligibilityChecked → AuthorizationRequested → SelfSigned → Submitted → {Confirmed | Rejected}`.
//!
//! Attempts for the same account are serialized by a per-account async lock,
//! so at most one authorization request per account is outstanding. Dropping
//! the future before `Submitted` abandons the attempt with no side effects;
//! after that the claim may land whether or not the caller waits.

use pulse_authority::AuthorityClient;
use pulse_chain::{ChainError, ClaimReceipt, ClaimSubmitter};
use pulse_codec::claim_digest;
use pulse_crypto::sign_digest;
use pulse_query::{Observed, ResilientReader, RetryPolicy};
use pulse_types::{
    Account, Amount, ClaimAuthorization, ClaimError, ClaimSubmission, EligibilityEstimate, KeyPair,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Default deadline for the submission call.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPhase {
    Idle,
    EligibilityChecked,
    AuthorizationRequested,
    SelfSigned,
    Submitted,
    Confirmed,
    Rejected,
}

impl ClaimPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ClaimPhase::Confirmed | ClaimPhase::Rejected)
    }

    fn can_advance_to(self, next: ClaimPhase) -> bool {
        use ClaimPhase::*;
        matches!(
            (self, next),
            (Idle, EligibilityChecked)
                | (Idle, Rejected)
                | (EligibilityChecked, AuthorizationRequested)
                | (AuthorizationRequested, SelfSigned)
                | (AuthorizationRequested, Rejected)
                | (SelfSigned, Submitted)
                | (SelfSigned, Rejected)
                | (Submitted, Confirmed)
                | (Submitted, Rejected)
        )
    }
}

impl fmt::Display for ClaimPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClaimPhase::Idle => "idle",
            ClaimPhase::EligibilityChecked => "eligibility_checked",
            ClaimPhase::AuthorizationRequested => "authorization_requested",
            ClaimPhase::SelfSigned => "self_signed",
            ClaimPhase::Submitted => "submitted",
            ClaimPhase::Confirmed => "confirmed",
            ClaimPhase::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// A confirmed claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub amount: Amount,
    /// `None` when the submission timed out and a later status read showed
    /// the account as claimed.
    pub receipt: Option<ClaimReceipt>,
}

/// Everything that happened during one attempt.
#[derive(Clone, Debug)]
pub struct ClaimReport {
    pub account: Account,
    pub transitions: Vec<ClaimPhase>,
    pub estimate: Observed<EligibilityEstimate>,
    pub authorization: Option<ClaimAuthorization>,
    pub outcome: Result<Confirmation, ClaimError>,
}

impl ClaimReport {
    pub fn phase(&self) -> ClaimPhase {
        self.transitions.last().copied().unwrap_or(ClaimPhase::Idle)
    }
}

struct Attempt {
    account: Account,
    transitions: Vec<ClaimPhase>,
    estimate: Observed<EligibilityEstimate>,
    authorization: Option<ClaimAuthorization>,
}

impl Attempt {
    fn new(account: Account) -> Self {
        Self {
            account,
            transitions: vec![ClaimPhase::Idle],
            estimate: Observed::Unknown {
                reason: "not checked".into(),
            },
            authorization: None,
        }
    }

    fn phase(&self) -> ClaimPhase {
        self.transitions.last().copied().unwrap_or(ClaimPhase::Idle)
    }

    fn advance(&mut self, next: ClaimPhase) {
        debug_assert!(
            self.phase().can_advance_to(next),
            "illegal claim transition {} -> {}",
            self.phase(),
            next
        );
        self.transitions.push(next);
    }

    fn finish(mut self, outcome: Result<Confirmation, ClaimError>) -> ClaimReport {
        match &outcome {
            Ok(_) => self.advance(ClaimPhase::Confirmed),
            Err(e) => {
                warn!(account = %self.account, phase = %self.phase(), reason = e.reason(), "claim rejected");
                self.advance(ClaimPhase::Rejected);
            }
        }
        ClaimReport {
            account: self.account,
            transitions: self.transitions,
            estimate: self.estimate,
            authorization: self.authorization,
            outcome,
        }
    }
}

pub struct ClaimOrchestrator {
    reader: ResilientReader,
    authority: Arc<dyn AuthorityClient>,
    submitter: Arc<dyn ClaimSubmitter>,
    units_per_transaction: Amount,
    authority_retry: RetryPolicy,
    submit_timeout: Duration,
    locks: AccountLocks,
    /// Accounts known to have claimed; never re-enter the flow for these.
    claimed: Mutex<HashSet<Account>>,
}

impl ClaimOrchestrator {
    pub fn new(
        reader: ResilientReader,
        authority: Arc<dyn AuthorityClient>,
        submitter: Arc<dyn ClaimSubmitter>,
        units_per_transaction: Amount,
    ) -> Self {
        let authority_retry = reader.policy().clone();
        Self {
            reader,
            authority,
            submitter,
            units_per_transaction,
            authority_retry,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            locks: Mutex::new(HashMap::new()),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_authority_retry(mut self, policy: RetryPolicy) -> Self {
        self.authority_retry = policy;
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Whether this orchestrator has seen `account` claim.
    pub fn is_locally_claimed(&self, account: &Account) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(account)
    }

    fn mark_claimed(&self, account: Account) {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(account);
    }

    /// Wait for exclusive use of `account`. The map entry lives only while
    /// some attempt holds or waits on it.
    async fn lock_account(&self, account: Account) -> AccountGuard<'_> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(locks.entry(account).or_default())
        };
        AccountGuard {
            locks: &self.locks,
            account,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Run a claim and return only the outcome.
    pub async fn claim(
        &self,
        keys: &KeyPair,
        referrer: Option<Account>,
    ) -> Result<Confirmation, ClaimError> {
        self.run(keys, referrer).await.outcome
    }

    /// Run one claim attempt for `keys.account` to a terminal phase.
    pub async fn run(&self, keys: &KeyPair, referrer: Option<Account>) -> ClaimReport {
        let account = keys.account;
        let referrer = referrer.and_then(Account::non_zero);
        let _guard = self.lock_account(account).await;
        let mut attempt = Attempt::new(account);

        if self.is_locally_claimed(&account) {
            return attempt.finish(Err(ClaimError::AlreadyClaimed));
        }

        // Informational only: failure leaves the estimate unknown and the flow continues.
        attempt.estimate = self
            .reader
            .eligibility_estimate(&account, self.units_per_transaction)
            .await
            .into();
        attempt.advance(ClaimPhase::EligibilityChecked);

        attempt.advance(ClaimPhase::AuthorizationRequested);
        let authorization = match self.request_authorization(&account, referrer).await {
            Ok(auth) => auth,
            Err(e) => {
                if e == ClaimError::AlreadyClaimed {
                    self.mark_claimed(account);
                }
                return attempt.finish(Err(e));
            }
        };
        attempt.authorization = Some(authorization);

        let claimant_sig = match sign_digest(&claim_digest(&authorization.request), &keys.private) {
            Ok(sig) => sig,
            Err(e) => return attempt.finish(Err(ClaimError::Internal(e.to_string()))),
        };
        attempt.advance(ClaimPhase::SelfSigned);

        let submission = ClaimSubmission::new(&authorization, &claimant_sig);
        attempt.advance(ClaimPhase::Submitted);
        let outcome = self.submit(&submission).await;
        match &outcome {
            Ok(confirmation) => {
                self.mark_claimed(account);
                info!(account = %account, amount = %confirmation.amount, "claim confirmed");
            }
            Err(ClaimError::AlreadyClaimed) => self.mark_claimed(account),
            Err(_) => {}
        }
        attempt.finish(outcome)
    }

    /// Ask the authority, retrying transport failures but never a protocol refusal.
    async fn request_authorization(
        &self,
        account: &Account,
        referrer: Option<Account>,
    ) -> Result<ClaimAuthorization, ClaimError> {
        let max_attempts = self.authority_retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.authority.request_authorization(account, referrer).await {
                Ok(auth) => return check_authorization(auth, account, referrer),
                Err(e) => e,
            };
            if err.is_terminal() || attempt >= max_attempts {
                return Err(err);
            }
            let pause = self.authority_retry.delay_after(attempt);
            warn!(
                account = %account,
                attempt,
                error = %err,
                retry_in_ms = pause.as_millis() as u64,
                "authority request failed, retrying"
            );
            tokio::time::sleep(pause).await;
        }
    }

    /// Submit once. A timeout is resolved by re-reading claim status rather
    /// than assumed to have failed.
    async fn submit(&self, submission: &ClaimSubmission) -> Result<Confirmation, ClaimError> {
        let account = submission.request.account;
        let amount = submission.request.amount;
        let result = tokio::time::timeout(self.submit_timeout, self.submitter.submit_claim(submission))
            .await
            .unwrap_or(Err(ChainError::Timeout));
        match result {
            Ok(receipt) => Ok(Confirmation {
                amount,
                receipt: Some(receipt),
            }),
            Err(ChainError::Timeout) => {
                warn!(account = %account, "submission outcome unknown, re-querying claim status");
                match self.reader.has_claimed(&account).await {
                    Ok(true) => Ok(Confirmation {
                        amount,
                        receipt: None,
                    }),
                    Ok(false) | Err(_) => Err(ClaimError::NetworkTimeout),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

type AccountLocks = Mutex<HashMap<Account, Arc<tokio::sync::Mutex<()>>>>;

/// Held for the duration of one attempt. Dropping it, including when the
/// attempt future is cancelled, releases the lock and forgets the account
/// once nobody else is queued on it.
struct AccountGuard<'a> {
    locks: &'a AccountLocks,
    account: Account,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks
            .get(&self.account)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.account);
        }
    }
}

/// The authority must answer for the account and referrer that were asked about.
fn check_authorization(
    auth: ClaimAuthorization,
    account: &Account,
    referrer: Option<Account>,
) -> Result<ClaimAuthorization, ClaimError> {
    if auth.request.account != *account || auth.request.referrer() != referrer {
        return Err(ClaimError::Internal(
            "authority answered for a different claim request".into(),
        ));
    }
    if auth.request.amount.is_zero() {
        return Err(ClaimError::NothingToClaim);
    }
    Ok(auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_the_state_machine() {
        use ClaimPhase::*;
        assert!(Idle.can_advance_to(EligibilityChecked));
        assert!(AuthorizationRequested.can_advance_to(Rejected));
        assert!(Submitted.can_advance_to(Confirmed));
        assert!(!Idle.can_advance_to(Submitted));
        assert!(!Confirmed.can_advance_to(Rejected));
        assert!(!EligibilityChecked.can_advance_to(Rejected));
        assert!(Rejected.is_terminal());
    }

    #[tokio::test]
    async fn account_locks_are_forgotten_after_each_attempt() {
        use pulse_authority::{PerTransaction, SigningAuthority};
        use pulse_chain::LocalChain;
        use pulse_crypto::generate_keypair;
        use pulse_types::U256;
        use pulse_utils::SystemClock;
        use pulse_verifier::VerifierParams;

        let authority_keys = generate_keypair();
        let chain = Arc::new(LocalChain::new(VerifierParams::new(
            authority_keys.account,
            U256::one(),
        )));
        let reader = || ResilientReader::new(chain.clone(), RetryPolicy::fixed(1, Duration::ZERO));
        let authority = SigningAuthority::new(
            authority_keys,
            reader(),
            Box::new(PerTransaction::new(U256::one())),
            Arc::new(SystemClock),
        );
        let orchestrator =
            ClaimOrchestrator::new(reader(), Arc::new(authority), chain.clone(), U256::one());
        let a = generate_keypair();
        let b = generate_keypair();
        chain.record_transactions(a.account, 2);

        let (first, second, other) = tokio::join!(
            orchestrator.claim(&a, None),
            orchestrator.claim(&a, None),
            orchestrator.claim(&b, None),
        );
        assert!(first.is_ok());
        assert!(matches!(second, Err(ClaimError::AlreadyClaimed)));
        assert!(matches!(other, Err(ClaimError::NothingToClaim)));
        assert!(orchestrator.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn foreign_authorization_is_refused() {
        use pulse_types::{ClaimRequest, Signature, U256};
        let auth = ClaimAuthorization {
            request: ClaimRequest::new(Account::new([2; 20]), U256::one(), None, U256::one()),
            authority_sig: Signature([0; 65]),
        };
        assert!(matches!(
            check_authorization(auth, &Account::new([1; 20]), None),
            Err(ClaimError::Internal(_))
        ));
    }
}

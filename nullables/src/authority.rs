//! Nullable signing authority: queued answers, recorded requests.

use async_trait::async_trait;
use pulse_authority::AuthorityClient;
use pulse_types::{Account, ClaimAuthorization, ClaimError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers from a queue. When the queue is empty, requests are forwarded to
/// the fallback authority if one is set, otherwise they fail with a
/// transient `Query` error.
#[derive(Default)]
pub struct ScriptedAuthority {
    answers: Mutex<VecDeque<Result<ClaimAuthorization, ClaimError>>>,
    fallback: Option<Arc<dyn AuthorityClient>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<(Account, Option<Account>)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer from `authority` once the scripted answers run out.
    pub fn wrapping(authority: Arc<dyn AuthorityClient>) -> Self {
        Self {
            fallback: Some(authority),
            ..Self::default()
        }
    }

    /// Hold every request this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn then(&self, answer: Result<ClaimAuthorization, ClaimError>) -> &Self {
        self.answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(answer);
        self
    }

    pub fn requests(&self) -> Vec<(Account, Option<Account>)> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    /// Most requests ever outstanding at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorityClient for ScriptedAuthority {
    async fn request_authorization(
        &self,
        account: &Account,
        referrer: Option<Account>,
    ) -> Result<ClaimAuthorization, ClaimError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((*account, referrer));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        let answer = match (scripted, &self.fallback) {
            (Some(answer), _) => answer,
            (None, Some(authority)) => authority.request_authorization(account, referrer).await,
            (None, None) => Err(ClaimError::Query("no scripted answer".into())),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        answer
    }
}

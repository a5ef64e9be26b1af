//! Nullable chain: scripted reads and recorded claim submissions.

use async_trait::async_trait;
use pulse_chain::{ChainError, ChainReader, ClaimReceipt, ClaimSubmitter, LocalChain};
use pulse_types::{Account, Amount, ClaimSubmission};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct ReaderState {
    block: u64,
    counts: HashMap<Account, u64>,
    balances: HashMap<Account, Amount>,
    claimed: HashSet<Account>,
    claimable: HashMap<Account, Amount>,
    failures_left: u32,
    stall: Option<Duration>,
}

/// A chain reader whose answers are set by the test.
///
/// Unknown accounts read as zero / unclaimed. `fail_next(n)` makes the next
/// `n` reads of any kind fail with a transient error.
#[derive(Default)]
pub struct NullChainReader {
    state: Mutex<ReaderState>,
    calls: AtomicU32,
}

impl NullChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ReaderState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_block(&self, block: u64) {
        self.state().block = block;
    }

    pub fn set_transaction_count(&self, account: Account, count: u64) {
        self.state().counts.insert(account, count);
    }

    pub fn set_balance(&self, account: Account, balance: Amount) {
        self.state().balances.insert(account, balance);
    }

    pub fn set_claimed(&self, account: Account, claimed: bool) {
        let mut state = self.state();
        if claimed {
            state.claimed.insert(account);
        } else {
            state.claimed.remove(&account);
        }
    }

    pub fn set_claimable(&self, account: Account, amount: Amount) {
        self.state().claimable.insert(account, amount);
    }

    /// Fail the next `n` reads.
    pub fn fail_next(&self, n: u32) {
        self.state().failures_left = n;
    }

    /// Make every read take this long before answering.
    pub fn stall_for(&self, delay: Duration) {
        self.state().stall = Some(delay);
    }

    /// Total reads attempted, including failed ones.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn read<T>(&self, f: impl FnOnce(&ReaderState) -> T) -> Result<T, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stall = self.state().stall;
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(ChainError::Unreachable("scripted failure".into()));
        }
        Ok(f(&*state))
    }
}

#[async_trait]
impl ChainReader for NullChainReader {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.read(|s| s.block).await
    }

    async fn transaction_count(&self, account: &Account, _block: u64) -> Result<u64, ChainError> {
        self.read(|s| s.counts.get(account).copied().unwrap_or(0)).await
    }

    async fn token_balance(&self, account: &Account) -> Result<Amount, ChainError> {
        self.read(|s| s.balances.get(account).copied().unwrap_or_default())
            .await
    }

    async fn has_claimed(&self, account: &Account) -> Result<bool, ChainError> {
        self.read(|s| s.claimed.contains(account)).await
    }

    async fn claimable_amount(&self, account: &Account) -> Result<Amount, ChainError> {
        self.read(|s| s.claimable.get(account).copied().unwrap_or_default())
            .await
    }
}

/// What a [`NullClaimSubmitter`] does with one submission.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitScript {
    /// Forward to the backing chain, or accept if there is none.
    Deliver,
    /// Deliver, then report a timeout: the claim landed but the caller
    /// never heard back.
    DeliverThenTimeout,
    /// Report a timeout without delivering.
    Timeout,
    /// Never answer.
    Hang,
    Fail(ChainError),
}

/// Records every submission and follows a script, defaulting to
/// [`SubmitScript::Deliver`].
#[derive(Default)]
pub struct NullClaimSubmitter {
    chain: Option<Arc<LocalChain>>,
    script: Mutex<VecDeque<SubmitScript>>,
    submitted: Mutex<Vec<ClaimSubmission>>,
    block: AtomicU64,
}

impl NullClaimSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward delivered submissions to `chain`'s verifier.
    pub fn forwarding_to(chain: Arc<LocalChain>) -> Self {
        Self {
            chain: Some(chain),
            ..Self::default()
        }
    }

    pub fn then(&self, step: SubmitScript) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(step);
        self
    }

    pub fn submitted(&self) -> Vec<ClaimSubmission> {
        self.submitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn deliver(&self, submission: &ClaimSubmission) -> Result<ClaimReceipt, ChainError> {
        match &self.chain {
            Some(chain) => chain.submit_claim(submission).await,
            None => Ok(ClaimReceipt {
                transaction_hash: format!("0x{:064x}", self.submitted().len()),
                block_number: self.block.fetch_add(1, Ordering::SeqCst) + 1,
                amount: submission.request.amount,
            }),
        }
    }
}

#[async_trait]
impl ClaimSubmitter for NullClaimSubmitter {
    async fn submit_claim(&self, submission: &ClaimSubmission) -> Result<ClaimReceipt, ChainError> {
        self.submitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(submission.clone());
        let step = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or(SubmitScript::Deliver);
        match step {
            SubmitScript::Deliver => self.deliver(submission).await,
            SubmitScript::DeliverThenTimeout => {
                self.deliver(submission).await?;
                Err(ChainError::Timeout)
            }
            SubmitScript::Timeout => Err(ChainError::Timeout),
            SubmitScript::Hang => std::future::pending().await,
            SubmitScript::Fail(e) => Err(e),
        }
    }
}

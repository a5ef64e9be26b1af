//! End-to-end claim scenarios: orchestrator, in-process signing authority,
//! and the verifier model behind a local chain.

use pulse_authority::{AuthorityClient, PerTransaction, SigningAuthority};
use pulse_chain::{ChainError, ChainReader, ClaimSubmitter, LocalChain};
use pulse_crypto::keypair_from_private;
use pulse_nullables::{NullChainReader, NullClaimSubmitter, NullClock, ScriptedAuthority, SubmitScript};
use pulse_query::{ResilientReader, RetryPolicy};
use pulse_types::{Account, ClaimError, KeyPair, PrivateKey, Signer, U256};
use pulse_verifier::VerifierParams;
use pulse_wallet_core::{ClaimOrchestrator, ClaimPhase};
use std::sync::Arc;
use std::time::Duration;

const UNITS: u64 = 100;

struct World {
    chain: Arc<LocalChain>,
    authority: Arc<ScriptedAuthority>,
    submitter: Arc<NullClaimSubmitter>,
}

fn keys(byte: u8) -> KeyPair {
    keypair_from_private(PrivateKey([byte; 32])).unwrap()
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy::fixed(3, Duration::ZERO)
}

fn reader(chain: Arc<dyn ChainReader>) -> ResilientReader {
    ResilientReader::new(chain, quick_retry())
}

impl World {
    fn new() -> Self {
        Self::with_authority(|signing| ScriptedAuthority::wrapping(signing))
    }

    fn with_authority(build: impl FnOnce(Arc<dyn AuthorityClient>) -> ScriptedAuthority) -> Self {
        let authority_keys = keys(0x11);
        let chain = Arc::new(LocalChain::new(VerifierParams::new(
            authority_keys.account,
            U256::from(UNITS),
        )));
        let signing = SigningAuthority::new(
            authority_keys,
            reader(chain.clone()),
            Box::new(PerTransaction::new(U256::from(UNITS))),
            Arc::new(NullClock::new(1_700_000_000_000)),
        );
        Self {
            authority: Arc::new(build(Arc::new(signing))),
            submitter: Arc::new(NullClaimSubmitter::forwarding_to(chain.clone())),
            chain,
        }
    }

    fn orchestrator(&self) -> ClaimOrchestrator {
        self.orchestrator_reading(self.chain.clone())
    }

    fn orchestrator_reading(&self, chain: Arc<dyn ChainReader>) -> ClaimOrchestrator {
        ClaimOrchestrator::new(
            reader(chain),
            self.authority.clone(),
            self.submitter.clone(),
            U256::from(UNITS),
        )
        .with_authority_retry(quick_retry())
        .with_submit_timeout(Duration::from_millis(200))
    }
}

#[tokio::test]
async fn account_without_history_is_rejected_with_nothing_to_claim() {
    let world = World::new();
    let a = keys(0xa1);

    let report = world.orchestrator().run(&a, None).await;

    assert_eq!(report.outcome, Err(ClaimError::NothingToClaim));
    assert_eq!(
        report.transitions,
        vec![
            ClaimPhase::Idle,
            ClaimPhase::EligibilityChecked,
            ClaimPhase::AuthorizationRequested,
            ClaimPhase::Rejected,
        ]
    );
    assert_eq!(world.authority.request_count(), 1);
    assert!(world.submitter.submitted().is_empty());
}

#[tokio::test]
async fn five_transactions_claim_once_and_replay_is_refused() {
    let world = World::new();
    let b = keys(0xb2);
    world.chain.record_transactions(b.account, 5);

    let report = world.orchestrator().run(&b, None).await;
    let confirmation = report.outcome.clone().unwrap();
    assert_eq!(confirmation.amount, U256::from(5 * UNITS));
    assert!(confirmation.receipt.is_some());
    assert_eq!(report.phase(), ClaimPhase::Confirmed);
    assert_eq!(report.transitions.len(), 6);
    let estimate = report.estimate.value().unwrap();
    assert_eq!(estimate.transaction_count, 5);
    assert_eq!(estimate.claimable_amount, U256::from(5 * UNITS));

    assert!(world.chain.verifier().has_claimed(&b.account));
    assert_eq!(world.chain.verifier().balance_of(&b.account), U256::from(5 * UNITS));

    let replay = world.submitter.submitted().remove(0);
    assert_eq!(
        world.chain.submit_claim(&replay).await,
        Err(ChainError::Rejected(ClaimError::AlreadyClaimed))
    );
}

#[tokio::test]
async fn confirmed_account_does_not_reenter_the_flow() {
    let world = World::new();
    let b = keys(0xb3);
    world.chain.record_transactions(b.account, 2);
    let orchestrator = world.orchestrator();

    orchestrator.claim(&b, None).await.unwrap();
    assert!(orchestrator.is_locally_claimed(&b.account));
    assert_eq!(orchestrator.claim(&b, None).await, Err(ClaimError::AlreadyClaimed));
    assert_eq!(world.authority.request_count(), 1);

    // A client without local memory is refused by the authority instead.
    assert_eq!(
        world.orchestrator().claim(&b, None).await,
        Err(ClaimError::AlreadyClaimed)
    );
    assert_eq!(world.authority.request_count(), 2);
}

#[tokio::test]
async fn concurrent_claims_for_one_account_are_serialized() {
    let world = World::with_authority(|signing| {
        ScriptedAuthority::wrapping(signing).with_delay(Duration::from_millis(20))
    });
    let b = keys(0xb4);
    world.chain.record_transactions(b.account, 3);
    let orchestrator = world.orchestrator();

    let (first, second) = tokio::join!(orchestrator.claim(&b, None), orchestrator.claim(&b, None));

    assert_eq!(world.authority.max_in_flight(), 1);
    assert_eq!(world.authority.request_count(), 1);
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(outcomes.contains(&Err(ClaimError::AlreadyClaimed)));
}

#[tokio::test]
async fn different_accounts_claim_independently() {
    let world = World::with_authority(|signing| {
        ScriptedAuthority::wrapping(signing).with_delay(Duration::from_millis(20))
    });
    let b = keys(0xb5);
    let c = keys(0xc5);
    world.chain.record_transactions(b.account, 1);
    world.chain.record_transactions(c.account, 2);
    let orchestrator = world.orchestrator();

    let (rb, rc) = tokio::join!(orchestrator.claim(&b, None), orchestrator.claim(&c, None));

    assert_eq!(rb.unwrap().amount, U256::from(UNITS));
    assert_eq!(rc.unwrap().amount, U256::from(2 * UNITS));
    assert_eq!(world.authority.max_in_flight(), 2);
}

#[tokio::test]
async fn timed_out_submission_that_landed_is_confirmed_by_requery() {
    let world = World::new();
    let b = keys(0xb6);
    world.chain.record_transactions(b.account, 1);
    world.submitter.then(SubmitScript::DeliverThenTimeout);

    let report = world.orchestrator().run(&b, None).await;

    let confirmation = report.outcome.unwrap();
    assert_eq!(confirmation.amount, U256::from(UNITS));
    assert_eq!(confirmation.receipt, None);
    assert!(world.chain.verifier().has_claimed(&b.account));
}

#[tokio::test]
async fn timed_out_submission_that_did_not_land_is_a_network_timeout() {
    let world = World::new();
    let b = keys(0xb7);
    world.chain.record_transactions(b.account, 1);
    world.submitter.then(SubmitScript::Hang);
    let orchestrator = world.orchestrator();

    let report = orchestrator.run(&b, None).await;
    assert_eq!(report.outcome, Err(ClaimError::NetworkTimeout));
    assert_eq!(
        &report.transitions[report.transitions.len() - 2..],
        &[ClaimPhase::Submitted, ClaimPhase::Rejected]
    );
    assert!(!orchestrator.is_locally_claimed(&b.account));

    // Retrying is safe: it takes a fresh authorization.
    let retried = orchestrator.claim(&b, None).await.unwrap();
    assert_eq!(retried.amount, U256::from(UNITS));
    let nonces: Vec<_> = world
        .submitter
        .submitted()
        .iter()
        .map(|s| s.request.nonce)
        .collect();
    assert_eq!(nonces.len(), 2);
    assert_ne!(nonces[0], nonces[1]);
}

#[tokio::test]
async fn transient_authority_failures_are_retried() {
    let world = World::new();
    let b = keys(0xb8);
    world.chain.record_transactions(b.account, 1);
    world
        .authority
        .then(Err(ClaimError::Query("authority returned HTTP 502".into())))
        .then(Err(ClaimError::NetworkTimeout));

    let confirmation = world.orchestrator().claim(&b, None).await.unwrap();
    assert_eq!(confirmation.amount, U256::from(UNITS));
    assert_eq!(world.authority.request_count(), 3);
}

#[tokio::test]
async fn authority_refusal_is_not_retried() {
    let world = World::new();
    let b = keys(0xb9);
    world.chain.record_transactions(b.account, 1);
    world
        .authority
        .then(Err(ClaimError::InvalidAddress(b.account.to_string())));

    let report = world.orchestrator().run(&b, None).await;
    assert_eq!(
        report.outcome,
        Err(ClaimError::InvalidAddress(b.account.to_string()))
    );
    assert_eq!(world.authority.request_count(), 1);
    assert!(report.authorization.is_none());
}

#[tokio::test]
async fn unreadable_estimate_does_not_block_the_claim() {
    let world = World::new();
    let b = keys(0xba);
    world.chain.record_transactions(b.account, 4);
    let broken = Arc::new(NullChainReader::new());
    broken.fail_next(3);

    let report = world.orchestrator_reading(broken).run(&b, None).await;

    assert!(!report.estimate.is_known());
    assert_eq!(report.outcome.unwrap().amount, U256::from(4 * UNITS));
}

#[tokio::test]
async fn tampered_authorization_is_rejected_by_the_verifier() {
    let world = World::new();
    let b = keys(0xbb);
    world.chain.record_transactions(b.account, 1);
    let mut forged = world
        .authority
        .request_authorization(&b.account, None)
        .await
        .unwrap();
    forged.request.amount = U256::from(1_000 * UNITS);
    world.authority.then(Ok(forged));

    let report = world.orchestrator().run(&b, None).await;

    assert_eq!(
        report.outcome,
        Err(ClaimError::InvalidSignature {
            signer: Signer::Authority
        })
    );
    assert!(!world.chain.verifier().has_claimed(&b.account));
}

#[tokio::test]
async fn referrer_earns_ten_percent() {
    let world = World::new();
    let b = keys(0xbc);
    let referrer = Account::new([0xee; 20]);
    world.chain.record_transactions(b.account, 5);

    world.orchestrator().claim(&b, Some(referrer)).await.unwrap();

    let verifier = world.chain.verifier();
    assert_eq!(verifier.referral_earnings(&referrer), U256::from(50u64));
    assert_eq!(verifier.referred_users(&referrer), vec![b.account]);
    assert_eq!(world.authority.requests(), vec![(b.account, Some(referrer))]);
}

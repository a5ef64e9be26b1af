//! Session persistence feeding a claim: import, reload, unlock, claim.

use pulse_authority::{PerTransaction, SigningAuthority};
use pulse_chain::LocalChain;
use pulse_crypto::{generate_keypair, keypair_from_private};
use pulse_nullables::{NullClock, NullSessionStore};
use pulse_query::{ResilientReader, RetryPolicy};
use pulse_types::{Account, PrivateKey, U256};
use pulse_verifier::VerifierParams;
use pulse_wallet_core::{
    ClaimOrchestrator, FileSessionStore, KdfParams, Session, SessionStore, WalletError,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn imported_wallet_survives_restart_and_claims() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let claimant = generate_keypair();

    {
        let store = FileSessionStore::new(&path);
        let mut session = store.load_checked().unwrap();
        session
            .import(&claimant, "hunter2", Some("main".into()), KdfParams::insecure_fast())
            .unwrap();
        store.save(&session).unwrap();
    }

    let session = FileSessionStore::new(&path).load_checked().unwrap();
    assert_eq!(session.selected, Some(claimant.account));
    assert!(matches!(session.unlock_selected("wrong"), Err(WalletError::Key(_))));
    let keys = session.unlock_selected("hunter2").unwrap();

    let authority_keys = keypair_from_private(PrivateKey([0x11; 32])).unwrap();
    let chain = Arc::new(LocalChain::new(VerifierParams::new(
        authority_keys.account,
        U256::one(),
    )));
    chain.record_transactions(keys.account, 3);
    let policy = RetryPolicy::fixed(3, Duration::ZERO);
    let authority = SigningAuthority::new(
        authority_keys,
        ResilientReader::new(chain.clone(), policy.clone()),
        Box::new(PerTransaction::new(U256::one())),
        Arc::new(NullClock::new(1)),
    );
    let orchestrator = ClaimOrchestrator::new(
        ResilientReader::new(chain.clone(), policy),
        Arc::new(authority),
        chain.clone(),
        U256::one(),
    );

    let confirmation = orchestrator.claim(&keys, None).await.unwrap();
    assert_eq!(confirmation.amount, U256::from(3u64));
    assert_eq!(chain.verifier().balance_of(&claimant.account), U256::from(3u64));
}

#[test]
fn stale_selection_is_repaired_on_load() {
    let keys = generate_keypair();
    let mut session = Session::new();
    session
        .import(&keys, "pw", None, KdfParams::insecure_fast())
        .unwrap();
    session.selected = Some(Account::new([0x42; 20]));
    let store = NullSessionStore::holding(session);

    let loaded = store.load_checked().unwrap();
    assert_eq!(loaded.selected, Some(keys.account));
    assert!(loaded.is_consistent());
    assert_eq!(store.saves(), 1);
    assert_eq!(store.stored(), loaded);

    store.load_checked().unwrap();
    assert_eq!(store.saves(), 1);
}

#[test]
fn removing_every_wallet_clears_selection() {
    let store = NullSessionStore::new();
    let mut session = store.load_checked().unwrap();
    let a = generate_keypair();
    let b = generate_keypair();
    session.import(&a, "pw", None, KdfParams::insecure_fast()).unwrap();
    session.import(&b, "pw", None, KdfParams::insecure_fast()).unwrap();
    session.select(&a.account).unwrap();
    session.remove(&a.account).unwrap();
    assert_eq!(session.selected, Some(b.account));
    session.remove(&b.account).unwrap();
    store.save(&session).unwrap();

    let reloaded = store.load_checked().unwrap();
    assert!(reloaded.wallets.is_empty());
    assert_eq!(reloaded.selected, None);
}

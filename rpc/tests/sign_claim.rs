//! The authority HTTP surface, driven through the router and over a real socket.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pulse_authority::{AuthorityClient, PerTransaction, SigningAuthority};
use pulse_chain::{ClaimSubmitter, LocalChain};
use pulse_codec::{claim_digest, ErrorBody, SignClaimResponse};
use pulse_crypto::{keypair_from_private, recover_signer, sign_digest};
use pulse_nullables::{NullChainReader, NullClock};
use pulse_query::{ResilientReader, RetryPolicy};
use pulse_rpc::{build_router, AppState, SIGN_CLAIM_ROUTE};
use pulse_types::{Account, ClaimError, ClaimSubmission, KeyPair, PrivateKey, U256};
use pulse_verifier::VerifierParams;
use pulse_wallet_core::HttpAuthorityClient;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn authority_keys() -> KeyPair {
    keypair_from_private(PrivateKey([0x11; 32])).unwrap()
}

fn setup() -> (Router, Arc<LocalChain>, AppState) {
    let chain = Arc::new(LocalChain::new(VerifierParams::new(
        authority_keys().account,
        U256::one(),
    )));
    let authority = SigningAuthority::new(
        authority_keys(),
        ResilientReader::new(chain.clone(), RetryPolicy::fixed(3, Duration::ZERO)),
        Box::new(PerTransaction::new(U256::one())),
        Arc::new(NullClock::new(1_700_000_000_000)),
    );
    let state = AppState::new(Arc::new(authority));
    (build_router(state.clone()), chain, state)
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_text(router: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn issues_authorization_for_eligible_account() {
    let (router, chain, _) = setup();
    let claimant = Account::new([0xb0; 20]);
    chain.record_transactions(claimant, 5);

    let (status, body) = post(router, SIGN_CLAIM_ROUTE, json!({ "address": claimant.to_string() })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], "5");
    assert_eq!(body["nonce"], "1700000000000");
    let response: SignClaimResponse = serde_json::from_value(body).unwrap();
    let auth = response.into_authorization(claimant, None).unwrap();
    assert_eq!(
        recover_signer(&claim_digest(&auth.request), auth.authority_sig.as_bytes()),
        Some(authority_keys().account)
    );
}

#[tokio::test]
async fn refusals_are_bad_requests_with_reason() {
    let (router, _, state) = setup();

    let (status, body) = post(
        router.clone(),
        SIGN_CLAIM_ROUTE,
        json!({ "address": Account::new([0xa0; 20]).to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "nothing_to_claim");

    let (status, body) = post(router.clone(), SIGN_CLAIM_ROUTE, json!({ "address": "0x1234" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_address");

    let (status, body) = post(router, SIGN_CLAIM_ROUTE, json!({ "referrer": "0x00" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_address");

    let rejections = state.metrics.encode();
    assert!(rejections.contains("reason=\"nothing_to_claim\"} 1"));
    assert!(rejections.contains("reason=\"invalid_address\"} 2"));
}

#[tokio::test]
async fn claimed_account_is_refused() {
    let (router, chain, _) = setup();
    let claimant = keypair_from_private(PrivateKey([0x22; 32])).unwrap();
    chain.record_transactions(claimant.account, 1);

    let (_, body) = post(
        router.clone(),
        SIGN_CLAIM_ROUTE,
        json!({ "address": claimant.account.to_string() }),
    )
    .await;
    let auth = serde_json::from_value::<SignClaimResponse>(body)
        .unwrap()
        .into_authorization(claimant.account, None)
        .unwrap();
    let own = sign_digest(&claim_digest(&auth.request), &claimant.private).unwrap();
    chain
        .submit_claim(&ClaimSubmission::new(&auth, &own))
        .await
        .unwrap();

    let (status, body) = post(
        router,
        SIGN_CLAIM_ROUTE,
        json!({ "address": claimant.account.to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "already_claimed");
}

#[tokio::test]
async fn invalid_referrer_is_ignored() {
    let (router, chain, _) = setup();
    let claimant = Account::new([0xb1; 20]);
    chain.record_transactions(claimant, 2);

    let (status, body) = post(
        router,
        SIGN_CLAIM_ROUTE,
        json!({ "address": claimant.to_string(), "referrer": "not-an-address" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: SignClaimResponse = serde_json::from_value(body).unwrap();
    assert!(response.into_authorization(claimant, None).is_ok());
}

#[tokio::test]
async fn unreadable_chain_is_an_internal_error_not_a_refusal() {
    let reader = Arc::new(NullChainReader::new());
    reader.fail_next(100);
    let authority = SigningAuthority::new(
        authority_keys(),
        ResilientReader::new(reader, RetryPolicy::fixed(3, Duration::ZERO)),
        Box::new(PerTransaction::new(U256::one())),
        Arc::new(NullClock::new(1)),
    );
    let router = build_router(AppState::new(Arc::new(authority)));

    let (status, body) = post(
        router,
        SIGN_CLAIM_ROUTE,
        json!({ "address": Account::new([0xb2; 20]).to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorBody = serde_json::from_value(body).unwrap();
    assert_eq!(error.reason, "internal_error");
}

#[tokio::test]
async fn attestation_endpoint_signs_current_count() {
    let (router, chain, _) = setup();
    let account = Account::new([0xc0; 20]);
    chain.record_transactions(account, 4);

    let (status, body) = post(
        router,
        pulse_rpc::ATTEST_COUNT_ROUTE,
        json!({ "address": account.to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attestation"]["count"], 4);
    assert_eq!(body["attestation"]["account"], account.to_string());
}

#[tokio::test]
async fn health_and_metrics() {
    let (router, chain, _) = setup();
    chain.record_transactions(Account::new([0xd0; 20]), 1);
    post(
        router.clone(),
        SIGN_CLAIM_ROUTE,
        json!({ "address": Account::new([0xd0; 20]).to_string() }),
    )
    .await;

    let (status, health) = get_text(router.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&health).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["authority"], authority_keys().account.to_string());

    let (status, metrics) = get_text(router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(metrics.contains("pulse_authorizations_issued_total 1"));
    assert!(metrics.contains("pulse_sign_claim_latency_ms_count 1"));
}

#[tokio::test]
async fn wallet_http_client_speaks_the_same_protocol() {
    let (router, chain, _) = setup();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });

    let client = HttpAuthorityClient::new(format!("http://{addr}")).unwrap();
    let claimant = Account::new([0xe0; 20]);
    let referrer = Account::new([0xe1; 20]);

    assert_eq!(
        client.request_authorization(&claimant, None).await,
        Err(ClaimError::NothingToClaim)
    );

    chain.record_transactions(claimant, 3);
    let auth = client
        .request_authorization(&claimant, Some(referrer))
        .await
        .unwrap();
    assert_eq!(auth.request.amount, U256::from(3u64));
    assert_eq!(auth.request.referrer(), Some(referrer));
}

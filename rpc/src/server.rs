//! Axum-based authority server.

use axum::routing::{get, post};
use axum::Router;
use pulse_authority::{EligibilityPolicy, PerTransaction, SigningAuthority, VerifierClaimable};
use pulse_chain::{ChainReader, ExplorerClient, LocalChain};
use pulse_query::ResilientReader;
use pulse_types::KeyPair;
use pulse_utils::SystemClock;
use pulse_verifier::VerifierParams;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{AuthorityConfig, PolicyKind};
use crate::error::RpcError;
use crate::handlers;
use crate::metrics::AuthorityMetrics;

pub const SIGN_CLAIM_ROUTE: &str = "/api/wallet/sign-claim";
pub const ATTEST_COUNT_ROUTE: &str = "/api/wallet/attest-count";

#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<SigningAuthority>,
    pub metrics: Arc<AuthorityMetrics>,
    pub started: Instant,
}

impl AppState {
    pub fn new(authority: Arc<SigningAuthority>) -> Self {
        Self {
            authority,
            metrics: Arc::new(AuthorityMetrics::new()),
            started: Instant::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(SIGN_CLAIM_ROUTE, post(handlers::sign_claim))
        .route(ATTEST_COUNT_ROUTE, post(handlers::attest_count))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

pub struct AuthorityServer {
    listen_addr: String,
    state: AppState,
    /// Present when running without an explorer.
    local_chain: Option<Arc<LocalChain>>,
}

impl AuthorityServer {
    pub fn new(listen_addr: impl Into<String>, authority: Arc<SigningAuthority>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            state: AppState::new(authority),
            local_chain: None,
        }
    }

    /// Wire the authority's chain reader and policy from configuration.
    pub fn from_config(config: &AuthorityConfig, keys: KeyPair) -> Result<Self, RpcError> {
        let (chain, local_chain): (Arc<dyn ChainReader>, Option<Arc<LocalChain>>) =
            match &config.explorer_url {
                Some(url) => {
                    let mut explorer = ExplorerClient::new(url.clone(), config.contract)
                        .map_err(|e| RpcError::Config(e.to_string()))?;
                    if let Some(key) = &config.explorer_api_key {
                        explorer = explorer.with_api_key(key.clone());
                    }
                    (Arc::new(explorer) as Arc<dyn ChainReader>, None)
                }
                None => {
                    warn!("no explorer configured, serving an in-process chain");
                    let local = Arc::new(LocalChain::new(VerifierParams::new(
                        keys.account,
                        config.units_per_transaction,
                    )));
                    (local.clone() as Arc<dyn ChainReader>, Some(local))
                }
            };

        let policy: Box<dyn EligibilityPolicy> = match config.policy {
            PolicyKind::PerTransaction => {
                Box::new(PerTransaction::new(config.units_per_transaction))
            }
            PolicyKind::VerifierClaimable => Box::new(VerifierClaimable),
        };
        let authority = SigningAuthority::new(
            keys,
            ResilientReader::new(chain, config.retry.clone()),
            policy,
            Arc::new(SystemClock),
        );
        let mut server = Self::new(config.listen_addr.clone(), Arc::new(authority));
        server.local_chain = local_chain;
        Ok(server)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn local_chain(&self) -> Option<&Arc<LocalChain>> {
        self.local_chain.as_ref()
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Serve until the process is stopped.
    pub async fn start(&self) -> Result<(), RpcError> {
        let listener = tokio::net::TcpListener::bind(&self.listen_addr).await?;
        info!(
            addr = %self.listen_addr,
            authority = %self.state.authority.account(),
            "authority server listening"
        );
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

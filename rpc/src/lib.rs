//! HTTP surface of the signing authority.
//!
//! - `POST /api/wallet/sign-claim`: `{address, referrer?}` to a signed claim authorization
//! - `POST /api/wallet/attest-count`: signed transaction-count attestation
//! - `GET /health`
//! - `GET /metrics`: Prometheus text exposition

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use config::{load_authority_key, AuthorityConfig, PolicyKind, AUTHORITY_KEY_ENV};
pub use error::{ApiError, RpcError};
pub use metrics::AuthorityMetrics;
pub use server::{build_router, AppState, AuthorityServer, ATTEST_COUNT_ROUTE, SIGN_CLAIM_ROUTE};

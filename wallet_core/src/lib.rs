//! Claimant side of the PulseWallet claim protocol.
//!
//! - [`ClaimOrchestrator`]: drives a claim from eligibility check to
//!   confirmation, one attempt per account at a time
//! - [`HttpAuthorityClient`]: talks to a remote signing authority
//! - [`Session`] and [`SessionStore`]: the stored wallet set and selected
//!   account, with secrets held in Argon2id + AES-GCM keystores
//! - [`DashboardSnapshot`]: balances and eligibility, unknown rather than zero
//!   when a source is down

pub mod authority_client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod keystore;
pub mod orchestrator;
pub mod session;
pub mod store;

pub use authority_client::{HttpAuthorityClient, SIGN_CLAIM_PATH};
pub use config::WalletConfig;
pub use dashboard::DashboardSnapshot;
pub use error::WalletError;
pub use keystore::{
    decrypt_keystore, encrypt_keystore, encrypt_keystore_with, load_keystore, save_keystore,
    KdfParams, KeystoreFile,
};
pub use orchestrator::{ClaimOrchestrator, ClaimPhase, ClaimReport, Confirmation};
pub use session::{Session, StoredWallet};
pub use store::{FileSessionStore, SessionStore};

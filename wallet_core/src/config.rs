//! Wallet configuration with TOML file support.

use pulse_query::RetryPolicy;
use pulse_types::{Account, Amount, U256};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::WalletError;

/// Configuration for the claimant side.
///
/// Loaded from a TOML file via [`WalletConfig::from_toml_file`]; every
/// field has a default so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Base URL of the signing authority.
    #[serde(default = "default_authority_url")]
    pub authority_url: String,

    /// Etherscan-style explorer API base URL.
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_api_key: Option<String>,

    /// Claim contract queried for claim status.
    #[serde(default)]
    pub contract: Account,

    /// Where the wallet session is persisted.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,

    /// Claimable amount per historical transaction, for the advisory estimate.
    #[serde(
        default = "default_units_per_transaction",
        with = "pulse_types::amount::decimal"
    )]
    pub units_per_transaction: Amount,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,

    /// Retry policy for chain reads and authority requests.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_authority_url() -> String {
    "http://127.0.0.1:3001".to_string()
}

fn default_explorer_url() -> String {
    "https://api.etherscan.io/api".to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./pulse-session.json")
}

/// One whole token (18 decimals).
fn default_units_per_transaction() -> Amount {
    U256::exp10(18)
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_submit_timeout_ms() -> u64 {
    30_000
}

impl WalletConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, WalletError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WalletError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            authority_url: default_authority_url(),
            explorer_url: default_explorer_url(),
            explorer_api_key: None,
            contract: Account::ZERO,
            session_path: default_session_path(),
            units_per_transaction: default_units_per_transaction(),
            request_timeout_ms: default_request_timeout_ms(),
            submit_timeout_ms: default_submit_timeout_ms(),
            retry: RetryPolicy::default(),
        }
    }
}

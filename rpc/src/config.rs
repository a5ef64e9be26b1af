//! Signing authority configuration with TOML file support.

use pulse_crypto::keypair_from_hex;
use pulse_query::RetryPolicy;
use pulse_types::{Account, Amount, KeyPair, U256};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::RpcError;

/// Environment variable holding the hex-encoded authority key.
pub const AUTHORITY_KEY_ENV: &str = "PULSE_AUTHORITY_KEY";

/// Which eligibility rule the authority applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Transaction count at the latest block times `units_per_transaction`.
    #[default]
    PerTransaction,
    /// The verifier's claimable amount from attested counts.
    VerifierClaimable,
}

/// Configuration for the authority service.
///
/// Every field has a default, so an empty file runs a development authority
/// on localhost against an in-process chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Etherscan-style explorer API. Without one the authority runs against
    /// an in-process chain (development only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_api_key: Option<String>,

    /// Claim contract read for claim status.
    #[serde(default)]
    pub contract: Account,

    #[serde(default)]
    pub policy: PolicyKind,

    #[serde(
        default = "default_units_per_transaction",
        with = "pulse_types::amount::decimal"
    )]
    pub units_per_transaction: Amount,

    /// File holding the hex authority key, used when the environment
    /// variable is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retry policy for chain reads.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_units_per_transaction() -> Amount {
    U256::exp10(18)
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AuthorityConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, RpcError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RpcError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, RpcError> {
        toml::from_str(s).map_err(|e| RpcError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, RpcError> {
        toml::to_string_pretty(self).map_err(|e| RpcError::Config(e.to_string()))
    }
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            explorer_url: None,
            explorer_api_key: None,
            contract: Account::ZERO,
            policy: PolicyKind::default(),
            units_per_transaction: default_units_per_transaction(),
            key_file: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Load the authority key from a hex string, or failing that from a file.
///
/// There is no fallback key: without either source the service must not start.
pub fn load_authority_key(hex: Option<&str>, file: Option<&Path>) -> Result<KeyPair, RpcError> {
    let owned;
    let hex = match (hex.filter(|h| !h.trim().is_empty()), file) {
        (Some(hex), _) => hex,
        (None, Some(path)) => {
            owned = std::fs::read_to_string(path).map_err(|e| {
                RpcError::Key(format!("failed to read {}: {e}", path.display()))
            })?;
            owned.as_str()
        }
        (None, None) => {
            return Err(RpcError::Key(format!(
                "no authority key: set {AUTHORITY_KEY_ENV} or key_file"
            )))
        }
    };
    keypair_from_hex(hex).map_err(|e| RpcError::Key(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    #[test]
    fn empty_file_gives_defaults() {
        let config = AuthorityConfig::from_toml_str("").unwrap();
        assert_eq!(config, AuthorityConfig::default());
        assert_eq!(config.listen_addr, "127.0.0.1:3001");
        assert_eq!(config.policy, PolicyKind::PerTransaction);
    }

    #[test]
    fn policy_and_explorer_from_file() {
        let config = AuthorityConfig::from_toml_str(
            r#"
            explorer_url = "https://api.example/api"
            policy = "verifier_claimable"
            units_per_transaction = "1"
            "#,
        )
        .unwrap();
        assert_eq!(config.explorer_url.as_deref(), Some("https://api.example/api"));
        assert_eq!(config.policy, PolicyKind::VerifierClaimable);
        assert_eq!(config.units_per_transaction, U256::one());
    }

    #[test]
    fn toml_roundtrip() {
        let config = AuthorityConfig {
            explorer_url: Some("https://api.example/api".into()),
            ..AuthorityConfig::default()
        };
        let back = AuthorityConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_key_refuses_to_start() {
        assert!(matches!(load_authority_key(None, None), Err(RpcError::Key(_))));
        assert!(matches!(load_authority_key(Some("  "), None), Err(RpcError::Key(_))));
        assert!(matches!(load_authority_key(Some("0xzz"), None), Err(RpcError::Key(_))));
    }

    #[test]
    fn key_from_env_value_or_file() {
        let from_hex = load_authority_key(Some(KEY), None).unwrap();
        let path = std::env::temp_dir().join(format!("pulse-key-{}.hex", std::process::id()));
        std::fs::write(&path, format!("{KEY}\n")).unwrap();
        let from_file = load_authority_key(None, Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(from_hex.account, from_file.account);
    }
}

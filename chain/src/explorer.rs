//! Explorer-backed chain reads.
//!
//! Speaks the Etherscan-style `?module=..&action=..` API: transaction lists
//! and token balances from the `account` module, contract reads through the
//! `proxy` module's `eth_call`. The explorer is untrusted and best-effort,
//! so every malformed or unsuccessful response is an error, never a zero.

use async_trait::async_trait;
use pulse_types::{amount, Account, Amount, U256};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::client::ChainReader;
use crate::error::ChainError;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// `hasClaimed(address)`
pub const HAS_CLAIMED_SELECTOR: [u8; 4] = [0xe1, 0x2f, 0x3a, 0x61];

/// `getClaimableAmount(address)`
pub const CLAIMABLE_AMOUNT_SELECTOR: [u8; 4] = [0x0c, 0xb3, 0xa4, 0x88];

/// Explorer reply. The `account` module sets `status`/`message`; the `proxy`
/// module returns JSON-RPC shaped bodies with `result` or `error`.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Client for an Etherscan-compatible explorer API.
#[derive(Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    /// Claim verifier contract (also the claim token).
    contract: Account,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>, contract: Account) -> Result<Self, ChainError> {
        Self::with_timeout(base_url, contract, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        contract: Account,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChainError::RequestFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: None,
            contract,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn contract(&self) -> Account {
        self.contract
    }

    async fn get(&self, params: &[(&str, String)]) -> Result<ExplorerResponse, ChainError> {
        let mut request = self.http.get(&self.base_url).query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("apikey", key)]);
        }
        let response = request.send().await.map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(ChainError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("failed to parse explorer response: {e}")))
    }

    async fn eth_call(&self, selector: [u8; 4], account: &Account) -> Result<U256, ChainError> {
        let params = [
            ("module", "proxy".to_string()),
            ("action", "eth_call".to_string()),
            ("to", self.contract.to_string()),
            ("data", call_data(selector, account)),
            ("tag", "latest".to_string()),
        ];
        let reply = self.get(&params).await?;
        parse_word(&reply)
    }
}

fn map_transport_error(e: reqwest::Error) -> ChainError {
    if e.is_timeout() {
        ChainError::Timeout
    } else if e.is_connect() {
        ChainError::Unreachable(format!("connection failed: {e}"))
    } else {
        ChainError::RequestFailed(e.to_string())
    }
}

/// ABI call data for a one-address function: selector ‖ left-padded address.
fn call_data(selector: [u8; 4], account: &Account) -> String {
    let mut data = [0u8; 36];
    data[..4].copy_from_slice(&selector);
    data[16..].copy_from_slice(account.as_bytes());
    format!("0x{}", hex::encode(data))
}

/// Fail on an explicit error or a non-"1" status.
fn check_status(reply: &ExplorerResponse) -> Result<(), ChainError> {
    if let Some(err) = &reply.error {
        return Err(ChainError::InvalidResponse(format!("explorer error: {err}")));
    }
    match reply.status.as_deref() {
        None | Some("1") => Ok(()),
        Some(status) => Err(ChainError::InvalidResponse(format!(
            "status {status}: {}",
            reply.message.as_deref().unwrap_or("no message")
        ))),
    }
}

fn result_str(reply: &ExplorerResponse) -> Result<&str, ChainError> {
    reply
        .result
        .as_str()
        .ok_or_else(|| ChainError::InvalidResponse(format!("unexpected result: {}", reply.result)))
}

/// Decode a single 32-byte ABI word. An empty `0x` result means the call
/// did not execute and is an error.
fn parse_word(reply: &ExplorerResponse) -> Result<U256, ChainError> {
    check_status(reply)?;
    let raw = result_str(reply)?;
    let hex_part = raw.strip_prefix("0x").unwrap_or(raw);
    if hex_part.is_empty() {
        return Err(ChainError::InvalidResponse("empty call result".into()));
    }
    let bytes = hex::decode(hex_part)
        .map_err(|e| ChainError::InvalidResponse(format!("bad call result: {e}")))?;
    if bytes.len() != 32 {
        return Err(ChainError::InvalidResponse(format!(
            "call result is {} bytes, expected 32",
            bytes.len()
        )));
    }
    Ok(U256::from_big_endian(&bytes))
}

fn parse_block_number(reply: &ExplorerResponse) -> Result<u64, ChainError> {
    check_status(reply)?;
    let raw = result_str(reply)?;
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|e| ChainError::InvalidResponse(format!("bad block number {raw:?}: {e}")))
}

fn parse_transaction_count(reply: &ExplorerResponse) -> Result<u64, ChainError> {
    // An empty history comes back as status "0" rather than an empty list.
    if reply.status.as_deref() == Some("0")
        && reply.message.as_deref() == Some("No transactions found")
    {
        return Ok(0);
    }
    check_status(reply)?;
    reply
        .result
        .as_array()
        .map(|txs| txs.len() as u64)
        .ok_or_else(|| ChainError::InvalidResponse("transaction list is not an array".into()))
}

fn parse_token_balance(reply: &ExplorerResponse) -> Result<Amount, ChainError> {
    check_status(reply)?;
    amount::parse_decimal(result_str(reply)?, "balance")
        .map_err(|e| ChainError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ChainReader for ExplorerClient {
    async fn block_number(&self) -> Result<u64, ChainError> {
        let params = [
            ("module", "proxy".to_string()),
            ("action", "eth_blockNumber".to_string()),
        ];
        parse_block_number(&self.get(&params).await?)
    }

    async fn transaction_count(&self, account: &Account, block: u64) -> Result<u64, ChainError> {
        let params = [
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", account.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", block.to_string()),
            ("sort", "asc".to_string()),
        ];
        let count = parse_transaction_count(&self.get(&params).await?)?;
        debug!(account = %account, block, count, "fetched transaction count");
        Ok(count)
    }

    async fn token_balance(&self, account: &Account) -> Result<Amount, ChainError> {
        let params = [
            ("module", "account".to_string()),
            ("action", "tokenbalance".to_string()),
            ("contractaddress", self.contract.to_string()),
            ("address", account.to_string()),
        ];
        parse_token_balance(&self.get(&params).await?)
    }

    async fn has_claimed(&self, account: &Account) -> Result<bool, ChainError> {
        Ok(!self.eth_call(HAS_CLAIMED_SELECTOR, account).await?.is_zero())
    }

    async fn claimable_amount(&self, account: &Account) -> Result<Amount, ChainError> {
        self.eth_call(CLAIMABLE_AMOUNT_SELECTOR, account).await
    }
}

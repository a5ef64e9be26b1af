use pulse_types::{Account, ClaimError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("no wallet stored for {0}")]
    UnknownWallet(Account),

    #[error("no wallet selected")]
    NoWalletSelected,

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Claim(#[from] ClaimError),
}

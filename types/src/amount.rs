//! 256-bit unsigned integers for claim amounts and nonces.
//!
//! Amounts are denominated in the smallest token unit. Both amounts and nonces
//! are encoded on the wire as decimal strings and in the claim message as
//! 32-byte big-endian words. Values that do not fit in 256 bits are rejected,
//! never truncated or wrapped.

pub use primitive_types::U256;

use crate::error::ClaimError;

/// A token amount in the smallest unit.
pub type Amount = U256;

/// A single-use claim nonce.
pub type Nonce = U256;

/// Parse a base-10 string into a `U256`.
pub fn parse_decimal(s: &str, field: &'static str) -> Result<U256, ClaimError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClaimError::InvalidField {
            field,
            reason: format!("not a decimal integer: {s:?}"),
        });
    }
    U256::from_dec_str(trimmed).map_err(|_| ClaimError::InvalidField {
        field,
        reason: "value exceeds 256 bits".to_string(),
    })
}

/// Interpret a big-endian byte slice of at most 32 bytes as a `U256`.
pub fn from_be_slice(bytes: &[u8], field: &'static str) -> Result<U256, ClaimError> {
    if bytes.len() > 32 {
        return Err(ClaimError::InvalidField {
            field,
            reason: format!("{} bytes exceeds 256 bits", bytes.len()),
        });
    }
    Ok(U256::from_big_endian(bytes))
}

/// Serde adapter: `U256` as a decimal string.
///
/// Use with `#[serde(with = "pulse_types::amount::decimal")]`.
pub mod decimal {
    use super::{parse_decimal, U256};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_decimal(&s, "uint256").map_err(serde::de::Error::custom)
    }
}

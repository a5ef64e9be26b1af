//! 20-byte account address.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimError;

/// An externally owned account, identified by its 20-byte address.
///
/// Derived from the account's secp256k1 public key (see `pulse_crypto::derive_account`).
/// Renders as lowercase `0x`-prefixed hex; parsing accepts any case.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Account([u8; 20]);

impl Account {
    /// Length of an address in bytes.
    pub const LEN: usize = 20;

    /// The zero account. Used as the "no referrer" sentinel.
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an account from a byte slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClaimError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| ClaimError::InvalidField {
            field: "account",
            reason: format!("expected {} bytes, got {}", Self::LEN, bytes.len()),
        })?;
        Ok(Self(arr))
    }

    /// Parse a `0x`-prefixed (or bare) hex address, reporting failures against `field`.
    pub fn parse_field(s: &str, field: &'static str) -> Result<Self, ClaimError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex_part.len() != Self::LEN * 2 {
            return Err(ClaimError::InvalidField {
                field,
                reason: format!(
                    "expected {} hex characters, got {}",
                    Self::LEN * 2,
                    hex_part.len()
                ),
            });
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut out).map_err(|e| ClaimError::InvalidField {
            field,
            reason: e.to_string(),
        })?;
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// `None` for the zero sentinel, `Some(self)` otherwise.
    pub fn non_zero(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self)
        }
    }
}

impl FromStr for Account {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field(s, "account")
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = hex::encode(self.0);
        write!(f, "Account(0x{}..{})", &full[..6], &full[34..])
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

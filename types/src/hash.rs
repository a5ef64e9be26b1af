//! Claim digest type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::ClaimError;

/// A 32-byte Keccak-256 digest of a canonically encoded claim message.
///
/// Authority, claimant and verifier all derive this value from the same
/// logical request; it is what both signatures commit to.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimDigest([u8; 32]);

impl ClaimDigest {
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a `0x`-prefixed hex digest.
    pub fn from_hex(s: &str) -> Result<Self, ClaimError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut out).map_err(|e| {
            ClaimError::InvalidField {
                field: "messageHash",
                reason: e.to_string(),
            }
        })?;
        Ok(Self(out))
    }
}

impl fmt::Debug for ClaimDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimDigest({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ClaimDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for ClaimDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClaimDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

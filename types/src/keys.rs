//! Key and signature types for claim signing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::address::Account;
use crate::error::ClaimError;

/// A 65-byte uncompressed secp256k1 public key (`0x04 ‖ x ‖ y`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 65]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0[1..9]))
    }
}

/// A 32-byte secp256k1 secret scalar.
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// A 65-byte recoverable ECDSA signature: `r ‖ s ‖ v`, with `v` in `{27, 28}`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 65]);

impl Signature {
    pub const LEN: usize = 65;

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// Build a signature from raw bytes. Anything other than exactly 65 bytes is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClaimError> {
        let arr: [u8; 65] = bytes.try_into().map_err(|_| ClaimError::InvalidField {
            field: "signature",
            reason: format!("expected {} bytes, got {}", Self::LEN, bytes.len()),
        })?;
        Ok(Self(arr))
    }

    /// Parse a `0x`-prefixed hex signature.
    pub fn from_hex(s: &str) -> Result<Self, ClaimError> {
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|e| {
            ClaimError::InvalidField {
                field: "signature",
                reason: e.to_string(),
            }
        })?;
        Self::from_slice(&bytes)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A secp256k1 key pair together with the account it controls.
///
/// Use `pulse_crypto::generate_keypair()` or `pulse_crypto::keypair_from_private()`
/// to construct key pairs. This struct is intentionally just data.
pub struct KeyPair {
    pub account: Account,
    pub public: PublicKey,
    pub private: PrivateKey,
}

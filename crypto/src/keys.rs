//! secp256k1 key generation and import.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use pulse_types::{KeyPair, PrivateKey, PublicKey};
use rand::rngs::OsRng;

use crate::address::derive_account;
use crate::error::CryptoError;

fn signing_key(private: &PrivateKey) -> Result<SigningKey, CryptoError> {
    SigningKey::from_slice(&private.0).map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
}

fn public_from_signing_key(key: &SigningKey) -> PublicKey {
    let point = k256::PublicKey::from(key.verifying_key()).to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(point.as_bytes());
    PublicKey(out)
}

/// Generate a new key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    let key = SigningKey::random(&mut OsRng);
    let public = public_from_signing_key(&key);
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&key.to_bytes());
    KeyPair {
        account: derive_account(&public),
        public,
        private: PrivateKey(secret),
    }
}

/// Derive the public key from a private key.
///
/// Fails if the scalar is zero or not below the curve order.
pub fn public_from_private(private: &PrivateKey) -> Result<PublicKey, CryptoError> {
    Ok(public_from_signing_key(&signing_key(private)?))
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> Result<KeyPair, CryptoError> {
    let public = public_from_private(&private)?;
    Ok(KeyPair {
        account: derive_account(&public),
        public,
        private,
    })
}

/// Import a key pair from a hex private key, with or without `0x`.
pub fn keypair_from_hex(hex_key: &str) -> Result<KeyPair, CryptoError> {
    let trimmed = hex_key.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(stripped, &mut bytes)
        .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
    keypair_from_private(PrivateKey(bytes))
}

//! Argon2id encrypted keystore for secp256k1 private keys.
//!
//! 1. Argon2id derives a 32-byte encryption key from the password and a random salt.
//! 2. AES-256-GCM encrypts the private key under a random nonce.
//! 3. Everything needed to decrypt (KDF parameters, salt, nonce) is stored
//!    alongside the ciphertext as hex in JSON.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use pulse_crypto::keypair_from_private;
use pulse_types::{Account, KeyPair, PrivateKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroizing;

use crate::error::WalletError;

const ARGON2_OUTPUT_LEN: usize = 32;
const SALT_LEN: usize = 32;
/// AES-GCM nonce length (96 bits).
const NONCE_LEN: usize = 12;
const KEYSTORE_VERSION: u32 = 1;

/// Argon2id cost parameters, stored with each keystore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory in KiB.
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MiB, 3 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory: 65_536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Minimal cost, for tests only.
    pub fn insecure_fast() -> Self {
        Self {
            memory: 64,
            iterations: 1,
            parallelism: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    /// Account the encrypted key belongs to, readable without the password.
    pub address: Account,
    pub crypto: KeystoreCrypto,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub kdf: String,
    pub kdf_params: KdfParams,
    pub salt: String,
    pub nonce: String,
    pub ciphertext: String,
}

/// Encrypt a key pair's private key with default KDF cost.
pub fn encrypt_keystore(keys: &KeyPair, password: &str) -> Result<KeystoreFile, WalletError> {
    encrypt_keystore_with(keys, password, KdfParams::default())
}

pub fn encrypt_keystore_with(
    keys: &KeyPair,
    password: &str,
    params: KdfParams,
) -> Result<KeystoreFile, WalletError> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let derived_key = derive_key(password, &salt, &params)?;
    let cipher = Aes256Gcm::new_from_slice(&derived_key[..])
        .map_err(|e| WalletError::Key(format!("AES key init failed: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), keys.private.0.as_ref())
        .map_err(|e| WalletError::Key(format!("encryption failed: {e}")))?;

    Ok(KeystoreFile {
        version: KEYSTORE_VERSION,
        address: keys.account,
        crypto: KeystoreCrypto {
            cipher: "aes-256-gcm".to_string(),
            kdf: "argon2id".to_string(),
            kdf_params: params,
            salt: hex::encode(salt),
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
        },
    })
}

/// Decrypt a keystore and rebuild its key pair.
///
/// Fails on a wrong password, corrupted data, or a key that does not belong
/// to the stored address.
pub fn decrypt_keystore(keystore: &KeystoreFile, password: &str) -> Result<KeyPair, WalletError> {
    if keystore.version != KEYSTORE_VERSION {
        return Err(WalletError::Key(format!(
            "unsupported keystore version: {}",
            keystore.version
        )));
    }

    let salt = hex::decode(&keystore.crypto.salt)
        .map_err(|e| WalletError::Key(format!("invalid salt hex: {e}")))?;
    let nonce_bytes = hex::decode(&keystore.crypto.nonce)
        .map_err(|e| WalletError::Key(format!("invalid nonce hex: {e}")))?;
    let ciphertext = hex::decode(&keystore.crypto.ciphertext)
        .map_err(|e| WalletError::Key(format!("invalid ciphertext hex: {e}")))?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(WalletError::Key(format!(
            "invalid nonce length: expected {NONCE_LEN}, got {}",
            nonce_bytes.len()
        )));
    }

    let derived_key = derive_key(password, &salt, &keystore.crypto.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(&derived_key[..])
        .map_err(|e| WalletError::Key(format!("AES key init failed: {e}")))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| {
                WalletError::Key("decryption failed: wrong password or corrupted data".into())
            })?,
    );
    if plaintext.len() != 32 {
        return Err(WalletError::Key(format!(
            "decrypted key has wrong length: expected 32, got {}",
            plaintext.len()
        )));
    }

    let mut secret = [0u8; 32];
    secret.copy_from_slice(&plaintext[..]);
    let keys = keypair_from_private(PrivateKey(secret))
        .map_err(|e| WalletError::Key(e.to_string()))?;
    if keys.account != keystore.address {
        return Err(WalletError::Key(format!(
            "keystore key belongs to {}, not {}",
            keys.account, keystore.address
        )));
    }
    Ok(keys)
}

pub fn save_keystore(keystore: &KeystoreFile, path: &Path) -> Result<(), WalletError> {
    let json = serde_json::to_string_pretty(keystore)
        .map_err(|e| WalletError::Storage(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| WalletError::Storage(format!("failed to write keystore file: {e}")))
}

pub fn load_keystore(path: &Path) -> Result<KeystoreFile, WalletError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| WalletError::Storage(format!("failed to read keystore file: {e}")))?;
    serde_json::from_str(&json)
        .map_err(|e| WalletError::Storage(format!("invalid keystore JSON: {e}")))
}

fn derive_key(
    password: &str,
    salt: &[u8],
    kdf: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, WalletError> {
    let params = Params::new(
        kdf.memory,
        kdf.iterations,
        kdf.parallelism,
        Some(ARGON2_OUTPUT_LEN),
    )
    .map_err(|e| WalletError::Key(format!("Argon2 params error: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output[..])
        .map_err(|e| WalletError::Key(format!("Argon2 hashing failed: {e}")))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_crypto::generate_keypair;

    fn encrypt(keys: &KeyPair, password: &str) -> KeystoreFile {
        encrypt_keystore_with(keys, password, KdfParams::insecure_fast()).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let keys = generate_keypair();
        let keystore = encrypt(&keys, "test-password-123");
        assert_eq!(keystore.address, keys.account);
        let back = decrypt_keystore(&keystore, "test-password-123").unwrap();
        assert_eq!(back.account, keys.account);
        assert_eq!(back.private.0, keys.private.0);
    }

    #[test]
    fn wrong_password_fails() {
        let keystore = encrypt(&generate_keypair(), "correct-password");
        assert!(decrypt_keystore(&keystore, "wrong-password").is_err());
    }

    #[test]
    fn default_cost_is_recorded() {
        let keystore = encrypt_keystore(&generate_keypair(), "pass").unwrap();
        assert_eq!(keystore.crypto.cipher, "aes-256-gcm");
        assert_eq!(keystore.crypto.kdf, "argon2id");
        assert_eq!(keystore.crypto.kdf_params, KdfParams::default());
    }

    #[test]
    fn swapped_address_is_detected() {
        let mut keystore = encrypt(&generate_keypair(), "pass");
        keystore.address = generate_keypair().account;
        assert!(decrypt_keystore(&keystore, "pass").is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let keys = generate_keypair();
        let keystore = encrypt(&keys, "file-test");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");

        save_keystore(&keystore, &path).unwrap();
        let loaded = load_keystore(&path).unwrap();
        assert_eq!(loaded, keystore);
        assert_eq!(decrypt_keystore(&loaded, "file-test").unwrap().account, keys.account);
    }

    #[test]
    fn unsupported_version_rejected() {
        let mut keystore = encrypt(&generate_keypair(), "pass");
        keystore.version = 99;
        assert!(decrypt_keystore(&keystore, "pass").is_err());
    }
}

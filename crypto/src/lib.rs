//! Cryptographic primitives for the PulseWallet claim protocol.
//!
//! - **secp256k1 ECDSA** with public-key recovery for signing and signer checks
//! - **Keccak-256** for message digests and account derivation
//! - EIP-191 personal-message prefixing, so claim signatures can never be
//!   replayed as raw transaction signatures
//! - Account derivation: last 20 bytes of Keccak-256 of the public key

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::derive_account;
pub use error::CryptoError;
pub use hash::{keccak256, keccak256_multi, personal_message_hash, PERSONAL_MESSAGE_PREFIX};
pub use keys::{generate_keypair, keypair_from_hex, keypair_from_private, public_from_private};
pub use sign::{recover_signer, sign_digest, verify_signer};

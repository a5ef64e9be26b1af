//! Account derivation from public keys.
//!
//! Account = last 20 bytes of Keccak-256(x ‖ y), where `x ‖ y` is the
//! uncompressed public key without its `0x04` tag byte.

use pulse_types::{Account, PublicKey};

use crate::hash::keccak256;

/// Derive the account controlled by a public key.
pub fn derive_account(public_key: &PublicKey) -> Account {
    let hash = keccak256(&public_key.0[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Account::new(out)
}

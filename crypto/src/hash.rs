//! Keccak-256 hashing and EIP-191 message prefixing.

use sha3::{Digest, Keccak256};

/// Prefix applied to a 32-byte digest before signing (EIP-191 version 0x45).
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Compute the Keccak-256 hash of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Keccak256::digest(data));
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// The hash that is actually signed for a 32-byte message digest.
///
/// `keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)`
pub fn personal_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    keccak256_multi(&[PERSONAL_MESSAGE_PREFIX, digest])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_empty_matches_known_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn keccak_deterministic() {
        assert_eq!(keccak256(b"hello pulse"), keccak256(b"hello pulse"));
        assert_ne!(keccak256(b"hello"), keccak256(b"world"));
    }

    #[test]
    fn keccak_multi_equivalent() {
        let single = keccak256(b"helloworld");
        let multi = keccak256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn prefixed_hash_differs_from_raw() {
        let digest = keccak256(b"claim");
        assert_ne!(personal_message_hash(&digest), digest);
        assert_ne!(personal_message_hash(&digest), keccak256(&digest));
    }
}

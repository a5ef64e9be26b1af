//! Recoverable ECDSA signing over prefixed claim digests.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use pulse_types::{Account, ClaimDigest, PrivateKey, PublicKey, Signature};

use crate::address::derive_account;
use crate::error::CryptoError;
use crate::hash::personal_message_hash;

/// Sign a claim digest with the personal-message prefix applied.
///
/// The returned signature is low-`s` with `v` in `{27, 28}`.
pub fn sign_digest(digest: &ClaimDigest, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let key = SigningKey::from_slice(&private_key.0)
        .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
    let prehash = personal_message_hash(digest.as_bytes());
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(&prehash)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = 27 + recovery_id.to_byte();
    Ok(Signature(out))
}

/// Recover the account that produced `signature` over `digest`.
///
/// Returns `None` for malformed signatures: wrong length, unknown `v`,
/// zero `r`/`s`, or high-`s` (malleability protection).
pub fn recover_signer(digest: &ClaimDigest, signature: &[u8]) -> Option<Account> {
    if signature.len() != Signature::LEN {
        return None;
    }
    let v = match signature[64] {
        v @ (27 | 28) => v - 27,
        v @ (0 | 1) => v,
        _ => return None,
    };
    let recovery_id = RecoveryId::from_byte(v)?;
    let sig = EcdsaSignature::from_slice(&signature[..64]).ok()?;
    if sig.normalize_s().is_some() {
        return None;
    }

    let prehash = personal_message_hash(digest.as_bytes());
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id).ok()?;
    let point = k256::PublicKey::from(&key).to_encoded_point(false);
    let mut public = [0u8; 65];
    public.copy_from_slice(point.as_bytes());
    Some(derive_account(&PublicKey(public)))
}

/// Whether `signature` over `digest` was produced by `expected`.
pub fn verify_signer(digest: &ClaimDigest, signature: &[u8], expected: &Account) -> bool {
    recover_signer(digest, signature).is_some_and(|signer| signer == *expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::keccak256;
    use crate::keys::{generate_keypair, keypair_from_hex};

    fn digest(msg: &[u8]) -> ClaimDigest {
        ClaimDigest::new(keccak256(msg))
    }

    #[test]
    fn sign_and_recover() {
        let kp = generate_keypair();
        let d = digest(b"claim for pulse");
        let sig = sign_digest(&d, &kp.private).unwrap();
        assert_eq!(recover_signer(&d, &sig.0), Some(kp.account));
        assert!(verify_signer(&d, &sig.0, &kp.account));
    }

    #[test]
    fn v_is_ethereum_style() {
        let kp = generate_keypair();
        let sig = sign_digest(&digest(b"v"), &kp.private).unwrap();
        assert!(sig.0[64] == 27 || sig.0[64] == 28);
    }

    #[test]
    fn zero_based_v_also_recovers() {
        let kp = generate_keypair();
        let d = digest(b"zero based");
        let mut sig = sign_digest(&d, &kp.private).unwrap().0;
        sig[64] -= 27;
        assert_eq!(recover_signer(&d, &sig), Some(kp.account));
    }

    #[test]
    fn wrong_digest_recovers_other_account() {
        let kp = generate_keypair();
        let sig = sign_digest(&digest(b"correct"), &kp.private).unwrap();
        assert!(!verify_signer(&digest(b"wrong"), &sig.0, &kp.account));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = generate_keypair();
        let kp2 = generate_keypair();
        let d = digest(b"test");
        let sig = sign_digest(&d, &kp1.private).unwrap();
        assert!(!verify_signer(&d, &sig.0, &kp2.account));
    }

    #[test]
    fn signature_deterministic() {
        let kp = keypair_from_hex(&"63".repeat(32)).unwrap();
        let d = digest(b"deterministic test");
        let sig1 = sign_digest(&d, &kp.private).unwrap();
        let sig2 = sign_digest(&d, &kp.private).unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn empty_and_zero_signatures_rejected() {
        let d = digest(b"placeholder");
        assert_eq!(recover_signer(&d, &[]), None);
        assert_eq!(recover_signer(&d, &[0u8; 65]), None);
        let mut zero_v27 = [0u8; 65];
        zero_v27[64] = 27;
        assert_eq!(recover_signer(&d, &zero_v27), None);
    }

    #[test]
    fn unknown_v_rejected() {
        let kp = generate_keypair();
        let d = digest(b"v byte");
        let mut sig = sign_digest(&d, &kp.private).unwrap().0;
        sig[64] = 35;
        assert_eq!(recover_signer(&d, &sig), None);
    }
}

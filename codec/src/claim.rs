//! Claim request encoding.
//!
//! Layout (104 bytes):
//!
//! | offset | len | field    |
//! |--------|-----|----------|
//! | 0      | 20  | account  |
//! | 20     | 32  | amount   |
//! | 52     | 20  | referrer |
//! | 72     | 32  | nonce    |

use pulse_crypto::keccak256;
use pulse_types::{amount, Account, ClaimDigest, ClaimError, ClaimRequest};

/// Size of an encoded claim request.
pub const CLAIM_ENCODED_LEN: usize = 20 + 32 + 20 + 32;

const AMOUNT_OFFSET: usize = 20;
const REFERRER_OFFSET: usize = 52;
const NONCE_OFFSET: usize = 72;

/// Encode a claim request into its canonical byte layout.
pub fn encode(request: &ClaimRequest) -> [u8; CLAIM_ENCODED_LEN] {
    let mut out = [0u8; CLAIM_ENCODED_LEN];
    out[..AMOUNT_OFFSET].copy_from_slice(request.account.as_bytes());
    out[AMOUNT_OFFSET..REFERRER_OFFSET].copy_from_slice(&request.amount.to_big_endian());
    out[REFERRER_OFFSET..NONCE_OFFSET].copy_from_slice(request.referrer.as_bytes());
    out[NONCE_OFFSET..].copy_from_slice(&request.nonce.to_big_endian());
    out
}

/// Decode a canonical encoding back into a claim request.
///
/// Anything other than exactly [`CLAIM_ENCODED_LEN`] bytes is an `InvalidField`.
pub fn decode(bytes: &[u8]) -> Result<ClaimRequest, ClaimError> {
    if bytes.len() != CLAIM_ENCODED_LEN {
        return Err(ClaimError::InvalidField {
            field: "claim",
            reason: format!(
                "expected {CLAIM_ENCODED_LEN} encoded bytes, got {}",
                bytes.len()
            ),
        });
    }
    Ok(ClaimRequest {
        account: Account::from_slice(&bytes[..AMOUNT_OFFSET])?,
        amount: amount::from_be_slice(&bytes[AMOUNT_OFFSET..REFERRER_OFFSET], "amount")?,
        referrer: Account::from_slice(&bytes[REFERRER_OFFSET..NONCE_OFFSET])?,
        nonce: amount::from_be_slice(&bytes[NONCE_OFFSET..], "nonce")?,
    })
}

/// Digest of an encoded message.
pub fn digest(bytes: &[u8]) -> ClaimDigest {
    ClaimDigest::new(keccak256(bytes))
}

/// `digest(encode(request))`.
pub fn claim_digest(request: &ClaimRequest) -> ClaimDigest {
    digest(&encode(request))
}

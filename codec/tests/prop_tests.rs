use proptest::prelude::*;

use pulse_codec::{claim_digest, decode, digest, encode};
use pulse_types::{Account, ClaimRequest, U256};

fn arb_u256() -> impl Strategy<Value = U256> {
    prop::array::uniform32(0u8..).prop_map(|b| U256::from_big_endian(&b))
}

fn arb_account() -> impl Strategy<Value = Account> {
    prop::array::uniform20(0u8..).prop_map(Account::new)
}

prop_compose! {
    fn arb_request()(
        account in arb_account(),
        amount in arb_u256(),
        referrer in arb_account(),
        nonce in arb_u256(),
    ) -> ClaimRequest {
        ClaimRequest { account, amount, referrer, nonce }
    }
}

proptest! {
    /// Encoding the same request twice yields identical bytes and digest.
    #[test]
    fn encoding_is_deterministic(req in arb_request()) {
        let a = encode(&req);
        let b = encode(&req.clone());
        prop_assert_eq!(a, b);
        prop_assert_eq!(digest(&a), digest(&b));
    }

    /// The encoding is lossless.
    #[test]
    fn decode_inverts_encode(req in arb_request()) {
        prop_assert_eq!(decode(&encode(&req)).unwrap(), req);
    }

    /// Changing the account changes the digest.
    #[test]
    fn account_is_bound(req in arb_request(), other in arb_account()) {
        prop_assume!(other != req.account);
        let mutated = ClaimRequest { account: other, ..req };
        prop_assert_ne!(claim_digest(&req), claim_digest(&mutated));
    }

    /// Changing the amount changes the digest.
    #[test]
    fn amount_is_bound(req in arb_request(), other in arb_u256()) {
        prop_assume!(other != req.amount);
        let mutated = ClaimRequest { amount: other, ..req };
        prop_assert_ne!(claim_digest(&req), claim_digest(&mutated));
    }

    /// Changing the referrer changes the digest.
    #[test]
    fn referrer_is_bound(req in arb_request(), other in arb_account()) {
        prop_assume!(other != req.referrer);
        let mutated = ClaimRequest { referrer: other, ..req };
        prop_assert_ne!(claim_digest(&req), claim_digest(&mutated));
    }

    /// Changing the nonce changes the digest.
    #[test]
    fn nonce_is_bound(req in arb_request(), other in arb_u256()) {
        prop_assume!(other != req.nonce);
        let mutated = ClaimRequest { nonce: other, ..req };
        prop_assert_ne!(claim_digest(&req), claim_digest(&mutated));
    }
}

//! Per-account nonce issuance.

use pulse_types::{Account, Nonce, U256};
use pulse_utils::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Issues strictly increasing nonces per account.
///
/// Each nonce is `max(previous + 1, now_ms)`, chosen while holding the issuer
/// lock, so two concurrent requests for one account can never receive the
/// same value and values keep rising across restarts without stored state.
pub struct NonceIssuer {
    clock: Arc<dyn Clock>,
    last: Mutex<HashMap<Account, u64>>,
}

impl NonceIssuer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(HashMap::new()),
        }
    }

    pub fn next(&self, account: &Account) -> Nonce {
        let now = self.clock.now_ms();
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // An entry at or behind the clock no longer constrains anything.
        last.retain(|_, prev| *prev >= now);
        let next = match last.get(account) {
            Some(prev) => now.max(prev.saturating_add(1)),
            None => now,
        };
        last.insert(*account, next);
        U256::from(next)
    }
}

//! Nullable session storage: kept in memory.

use pulse_wallet_core::{Session, SessionStore, WalletError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct NullSessionStore {
    stored: Mutex<Session>,
    saves: AtomicUsize,
}

impl NullSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a session as if it had been written by an earlier run.
    pub fn holding(session: Session) -> Self {
        Self {
            stored: Mutex::new(session),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Session {
        self.stored
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SessionStore for NullSessionStore {
    fn load(&self) -> Result<Session, WalletError> {
        Ok(self.stored())
    }

    fn save(&self, session: &Session) -> Result<(), WalletError> {
        *self
            .stored
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

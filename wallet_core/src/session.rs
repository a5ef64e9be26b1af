//! The locally stored wallet set and the selected-wallet pointer.
//!
//! Invariant: `selected`, when set, names a wallet in `wallets`. Mutators
//! maintain it; [`Session::normalize`] repairs a session read from storage.

use pulse_types::{Account, KeyPair};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::WalletError;
use crate::keystore::{decrypt_keystore, encrypt_keystore_with, KdfParams, KeystoreFile};

/// One imported wallet; the private key is only held encrypted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWallet {
    pub account: Account,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub keystore: KeystoreFile,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub wallets: Vec<StoredWallet>,
    pub selected: Option<Account>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encrypt and add `keys`, replacing any wallet for the same account, and select it.
    pub fn import(
        &mut self,
        keys: &KeyPair,
        password: &str,
        label: Option<String>,
        kdf: KdfParams,
    ) -> Result<Account, WalletError> {
        let keystore = encrypt_keystore_with(keys, password, kdf)?;
        let wallet = StoredWallet {
            account: keys.account,
            label,
            keystore,
        };
        match self.position(&keys.account) {
            Some(i) => self.wallets[i] = wallet,
            None => self.wallets.push(wallet),
        }
        self.selected = Some(keys.account);
        info!(account = %keys.account, wallets = self.wallets.len(), "wallet imported");
        Ok(keys.account)
    }

    pub fn select(&mut self, account: &Account) -> Result<(), WalletError> {
        if self.position(account).is_none() {
            return Err(WalletError::UnknownWallet(*account));
        }
        self.selected = Some(*account);
        Ok(())
    }

    /// Remove a wallet. If it was selected, the first remaining wallet becomes selected.
    pub fn remove(&mut self, account: &Account) -> Result<StoredWallet, WalletError> {
        let i = self
            .position(account)
            .ok_or(WalletError::UnknownWallet(*account))?;
        let removed = self.wallets.remove(i);
        if self.selected == Some(*account) {
            self.selected = self.wallets.first().map(|w| w.account);
        }
        Ok(removed)
    }

    pub fn get(&self, account: &Account) -> Option<&StoredWallet> {
        self.wallets.iter().find(|w| w.account == *account)
    }

    pub fn selected_wallet(&self) -> Option<&StoredWallet> {
        self.selected.as_ref().and_then(|a| self.get(a))
    }

    /// Decrypt the selected wallet's key pair.
    pub fn unlock_selected(&self, password: &str) -> Result<KeyPair, WalletError> {
        let wallet = self.selected_wallet().ok_or(WalletError::NoWalletSelected)?;
        decrypt_keystore(&wallet.keystore, password)
    }

    /// Repair a session read from storage. Entries are never dropped: an entry
    /// whose label disagrees with its keystore is relabelled with the
    /// keystore's address, since decryption checks the key against that
    /// address. A dangling or missing selection then falls back to the first
    /// wallet, or none if the set is empty. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for wallet in &mut self.wallets {
            if wallet.account != wallet.keystore.address {
                warn!(
                    stored = %wallet.account,
                    keystore = %wallet.keystore.address,
                    "wallet entry disagrees with its keystore, relabelling"
                );
                wallet.account = wallet.keystore.address;
                changed = true;
            }
        }

        let valid = self
            .selected
            .map(|a| self.position(&a).is_some())
            .unwrap_or(false);
        if !valid {
            let repaired = self.wallets.first().map(|w| w.account);
            if repaired != self.selected {
                warn!(
                    stale = ?self.selected,
                    selected = ?repaired,
                    "selected wallet not in stored set, reselecting"
                );
                self.selected = repaired;
                changed = true;
            }
        }
        changed
    }

    pub fn is_consistent(&self) -> bool {
        match self.selected {
            Some(a) => self.position(&a).is_some(),
            None => self.wallets.is_empty(),
        }
    }

    fn position(&self, account: &Account) -> Option<usize> {
        self.wallets.iter().position(|w| w.account == *account)
    }
}

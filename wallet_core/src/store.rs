//! Session persistence.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::WalletError;
use crate::session::Session;

/// Where the session lives between runs.
pub trait SessionStore: Send + Sync {
    /// Read the raw stored session. A store that has never been written
    /// returns an empty session.
    fn load(&self) -> Result<Session, WalletError>;

    fn save(&self, session: &Session) -> Result<(), WalletError>;

    /// Load and enforce the selected-wallet invariant, writing back any repair.
    fn load_checked(&self) -> Result<Session, WalletError> {
        let mut session = self.load()?;
        if session.normalize() {
            self.save(&session)?;
        }
        Ok(session)
    }
}

/// JSON file on disk. Writes go to a sibling temp file and are renamed into
/// place, so a crash mid-write leaves the previous session intact.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, WalletError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session file, starting empty");
                return Ok(Session::new());
            }
            Err(e) => {
                return Err(WalletError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&json).map_err(|e| {
            WalletError::Storage(format!("invalid session file {}: {e}", self.path.display()))
        })
    }

    fn save(&self, session: &Session) -> Result<(), WalletError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| WalletError::Storage(format!("failed to create {}: {e}", dir.display())))?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| WalletError::Storage(format!("JSON serialization failed: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| WalletError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            WalletError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })?;
        info!(path = %self.path.display(), wallets = session.wallets.len(), "session saved");
        Ok(())
    }
}

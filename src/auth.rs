use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use parking_lot::Mutex;

use crate::error::ClientError;

/// Locally persisted bearer credential. The API client attaches it to every
/// call when present and clears it on an unauthorized response.
pub struct CredentialStore {
    path: PathBuf,
    token: Mutex<Option<String>>,
}

impl CredentialStore {
    /// Loads any previously persisted token from `path`.
    pub fn new(path: PathBuf) -> Self {
        let token = match fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(_) => None,
        };

        if token.is_some() {
            info!("🔑 Loaded persisted credential from {}", path.display());
        }

        Self {
            path,
            token: Mutex::new(token),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.lock().is_some()
    }

    pub fn store(&self, token: &str) -> Result<(), ClientError> {
        fs::write(&self.path, token)?;
        *self.token.lock() = Some(token.to_string());
        info!("🔑 Credential persisted to {}", self.path.display());
        Ok(())
    }

    /// Drops the in-memory token and removes the persisted copy.
    pub fn clear(&self) {
        *self.token.lock() = None;
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("⚠️ Failed to remove persisted credential: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_clears_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let store = CredentialStore::new(path.clone());
        assert!(!store.is_authenticated());

        store.store("secret-token").unwrap();
        assert_eq!(store.token().as_deref(), Some("secret-token"));

        // A fresh store picks the persisted token back up.
        let reloaded = CredentialStore::new(path.clone());
        assert_eq!(reloaded.token().as_deref(), Some("secret-token"));

        store.clear();
        assert!(store.token().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn ignores_blank_persisted_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "   \n").unwrap();

        let store = CredentialStore::new(path);
        assert!(store.token().is_none());
    }
}

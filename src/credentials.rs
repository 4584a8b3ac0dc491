//! Persistent storage for the bearer credential.
//!
//! The backend issues an opaque token on login that must survive process
//! restarts. `CredentialStore` keeps it in memory behind a shared handle
//! (the client and the auth context hold clones of the same store) and
//! mirrors it to a file so the next startup can validate it.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

/// Shared handle to the current bearer token.
///
/// Clones share state: clearing the token through one handle clears it
/// everywhere, which is what makes the client's 401 side effect visible to
/// the auth context.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    token: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Open a store backed by the given file, loading any persisted token.
    pub fn open(path: PathBuf) -> Self {
        let token = fs::read_to_string(&path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            inner: Arc::new(Inner {
                path: Some(path),
                token: RwLock::new(token),
            }),
        }
    }

    /// Open a store at the default location under the user's home directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(Self::default_path()?))
    }

    /// An in-memory store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                path: None,
                token: RwLock::new(None),
            }),
        }
    }

    /// The default token file, `$HOME/.config/gemidoc/token`.
    pub fn default_path() -> Result<PathBuf> {
        let home = env::var("HOME")
            .map_err(|_| Error::validation("HOME environment variable not set", None))?;
        Ok(PathBuf::from(home).join(".config").join("gemidoc").join("token"))
    }

    /// The current token, if any.
    pub fn token(&self) -> Option<String> {
        self.inner.token.read().expect("credential lock poisoned").clone()
    }

    /// True if a token is present.
    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Store a new token, persisting it when file-backed.
    pub fn store(&self, token: &str) -> Result<()> {
        if let Some(path) = &self.inner.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| Error::io("failed to create credential directory", err))?;
            }
            fs::write(path, token)
                .map_err(|err| Error::io("failed to persist credential", err))?;
        }
        *self.inner.token.write().expect("credential lock poisoned") = Some(token.to_string());
        Ok(())
    }

    /// Discard the token, removing the persisted copy when file-backed.
    /// Idempotent; a missing file is not an error.
    pub fn clear(&self) {
        if let Some(path) = &self.inner.path {
            let _ = fs::remove_file(path);
        }
        *self.inner.token.write().expect("credential lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        env::temp_dir().join(format!("gemidoc-cred-{}", Uuid::new_v4()))
    }

    #[test]
    fn in_memory_store_round_trip() {
        let store = CredentialStore::in_memory();
        assert!(!store.has_token());
        store.store("tok-1").unwrap();
        assert_eq!(store.token().as_deref(), Some("tok-1"));
        store.clear();
        assert!(!store.has_token());
    }

    #[test]
    fn clones_share_state() {
        let store = CredentialStore::in_memory();
        let other = store.clone();
        store.store("tok-2").unwrap();
        assert_eq!(other.token().as_deref(), Some("tok-2"));
        other.clear();
        assert!(!store.has_token());
    }

    #[test]
    fn file_backed_store_persists() {
        let path = scratch_path();
        {
            let store = CredentialStore::open(path.clone());
            store.store("tok-3").unwrap();
        }
        let reopened = CredentialStore::open(path.clone());
        assert_eq!(reopened.token().as_deref(), Some("tok-3"));
        reopened.clear();
        assert!(!path.exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let store = CredentialStore::open(scratch_path());
        store.clear();
        store.clear();
        assert!(!store.has_token());
    }
}

//! Process-wide ownership of the bearer credential.
//!
//! A [`Session`] is created once and handed to every client. Login sets it,
//! logout and any 401/403 response clear it. When backed by a
//! [`TokenStore`] the token survives across CLI invocations.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use tracing::{debug, info, warn};

use crate::{error::Result, models::UserRole};

/// Bearer token plus whatever the login response told us about its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub username: Option<String>,
    pub role: Option<UserRole>,
}

impl Credential {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: None,
            role: None,
        }
    }
}

/// File-backed token persistence.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or blank file means no token.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)?;
        debug!("Token saved to {}", self.path.display());
        Ok(())
    }

    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    credential: Arc<RwLock<Option<Credential>>>,
    store: Option<TokenStore>,
}

impl Session {
    /// In-memory session with no credential.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with a token, not persisted anywhere.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            credential: Arc::new(RwLock::new(Some(Credential::from_token(token)))),
            store: None,
        }
    }

    /// Session persisted through `store`, loading any token already saved there.
    pub fn with_store(store: TokenStore) -> Result<Self> {
        let credential = store.load()?.map(Credential::from_token);
        if credential.is_some() {
            info!("Loaded saved token from {}", store.path().display());
        }
        Ok(Self {
            credential: Arc::new(RwLock::new(credential)),
            store: Some(store),
        })
    }

    pub fn set(&self, credential: Credential) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(&credential.token)?;
        }
        *self.write() = Some(credential);
        Ok(())
    }

    /// Drops the credential from memory and from the store. Store failures are
    /// logged, not returned: clearing happens on error paths already.
    pub fn clear(&self) {
        *self.write() = None;
        if let Some(store) = &self.store {
            if let Err(e) = store.remove() {
                warn!("Failed to remove token file {}: {}", store.path().display(), e);
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.token.clone())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Credential>> {
        self.credential.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credential>> {
        self.credential.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> TokenStore {
        TokenStore::new(dir.path().join("nested").join("token"))
    }

    #[test]
    fn test_token_store_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load().unwrap(), None);
    }

    #[test]
    fn test_token_store_roundtrip_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("abc.def").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc.def".to_string()));

        store.remove().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // second remove is a no-op
        store.remove().unwrap();
    }

    #[test]
    fn test_token_store_blank_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("  \n").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_session_set_and_clear() {
        let session = Session::new();
        assert!(!session.is_authenticated());

        session
            .set(Credential {
                token: "tok".to_string(),
                username: Some("admin".to_string()),
                role: Some(UserRole::Admin),
            })
            .unwrap();
        assert_eq!(session.token().as_deref(), Some("tok"));
        assert_eq!(session.credential().unwrap().role, Some(UserRole::Admin));

        session.clear();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_session_clones_share_state() {
        let session = Session::with_token("shared");
        let other = session.clone();
        other.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_session_with_store_persists() {
        let dir = TempDir::new().unwrap();
        let session = Session::with_store(store_in(&dir)).unwrap();
        assert!(!session.is_authenticated());

        session.set(Credential::from_token("persisted")).unwrap();

        let reloaded = Session::with_store(store_in(&dir)).unwrap();
        assert_eq!(reloaded.token().as_deref(), Some("persisted"));

        reloaded.clear();
        assert_eq!(store_in(&dir).load().unwrap(), None);
    }
}

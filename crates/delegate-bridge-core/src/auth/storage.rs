/*
[INPUT]:  Session key, delegation chain, storage backend
[OUTPUT]: Persisted session material and restored identity state
[POS]:    Auth layer - durable session persistence and restore-on-load
[UPDATE]: When storage keys, key formats or restore semantics change
*/

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::http::{IdentityError, Result};
use crate::types::{DelegationChain, Status};

use super::{DelegatedIdentity, Identity, IdentityStore, SessionKey, StatePatch};

/// Storage key for serialized session key material.
pub const KEY_STORAGE_KEY: &str = "identity";

/// Storage key for the serialized delegation chain.
pub const KEY_STORAGE_DELEGATION: &str = "delegation";

/// Durable key/value store that survives restarts.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> io::Result<()>;

    async fn remove(&self, key: &str) -> io::Result<()>;
}

/// One file per key inside a directory, readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a new file storage rooted at the given directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the expected file path for a key
    pub fn key_file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.key_file_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.key_file_path(key);
        fs::write(&path, value).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(&path).await?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms).await?;
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.key_file_path(key)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-process storage, useful for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> io::Error {
    io::Error::other("memory storage lock poisoned")
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// Persist the session key and chain, replacing any prior session.
pub async fn store_identity(
    storage: &dyn KeyValueStorage,
    session: &SessionKey,
    chain: &DelegationChain,
) -> Result<()> {
    let key_json = session.to_json().map_err(|e| {
        IdentityError::storage(
            "Failed to serialize session key",
            io::Error::new(io::ErrorKind::InvalidData, e),
        )
    })?;
    let chain_json = chain.to_json().map_err(|e| {
        IdentityError::storage(
            "Failed to serialize delegation chain",
            io::Error::new(io::ErrorKind::InvalidData, e),
        )
    })?;

    let previous_key = storage
        .get(KEY_STORAGE_KEY)
        .await
        .map_err(|e| IdentityError::storage("Failed to read session key", e))?;

    storage
        .set(KEY_STORAGE_KEY, &key_json)
        .await
        .map_err(|e| IdentityError::storage("Failed to persist session key", e))?;

    if let Err(e) = storage.set(KEY_STORAGE_DELEGATION, &chain_json).await {
        // Put the previous key back so the stored pair stays consistent
        let rollback = match previous_key {
            Some(previous) => storage.set(KEY_STORAGE_KEY, &previous).await,
            None => storage.remove(KEY_STORAGE_KEY).await,
        };
        if let Err(rollback_err) = rollback {
            warn!(error = %rollback_err, "failed to roll back session key");
        }
        return Err(IdentityError::storage("Failed to persist delegation chain", e));
    }

    Ok(())
}

/// Remove both persisted entries.
pub async fn clear_session(storage: &dyn KeyValueStorage) -> Result<()> {
    storage
        .remove(KEY_STORAGE_KEY)
        .await
        .map_err(|e| IdentityError::storage("Failed to remove session key", e))?;
    storage
        .remove(KEY_STORAGE_DELEGATION)
        .await
        .map_err(|e| IdentityError::storage("Failed to remove delegation chain", e))?;
    Ok(())
}

/// Read and parse the persisted pair; `Ok(None)` when either entry is absent.
pub async fn load_session(
    storage: &dyn KeyValueStorage,
) -> Result<Option<(SessionKey, DelegationChain)>> {
    let key_json = storage
        .get(KEY_STORAGE_KEY)
        .await
        .map_err(|e| IdentityError::storage("Failed to read session key", e))?;
    let chain_json = storage
        .get(KEY_STORAGE_DELEGATION)
        .await
        .map_err(|e| IdentityError::storage("Failed to read delegation chain", e))?;

    let (Some(key_json), Some(chain_json)) = (key_json, chain_json) else {
        return Ok(None);
    };

    let session = SessionKey::from_json(&key_json)?;
    let chain = DelegationChain::from_json(&chain_json)?;
    Ok(Some((session, chain)))
}

/// What restore-on-load found. The store is seeded the same way for
/// `NoSession` and `Expired`; only the caller sees the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    NoSession,
    Expired,
}

/// Seed the store from persisted material at startup.
///
/// Never sets `Status::Error`: a missing, unreadable, mismatched or expired
/// session just means "not logged in".
pub async fn restore_session(storage: &dyn KeyValueStorage, store: &IdentityStore) -> RestoreOutcome {
    let outcome = match load_session(storage).await {
        Ok(Some((session, chain)))
            if chain.session_public_key() != Some(session.public_key_der().as_slice()) =>
        {
            warn!("persisted chain does not delegate to the persisted session key");
            RestoreOutcome::NoSession
        }
        Ok(Some((session, chain))) if chain.is_valid() => {
            let identity = DelegatedIdentity::new(Arc::new(session), chain);
            store.set_state(
                StatePatch::new()
                    .status(Status::Success)
                    .identity(Some(Identity::Delegated(identity)))
                    .error(None),
            );
            info!("restored persisted session");
            return RestoreOutcome::Restored;
        }
        Ok(Some(_)) => RestoreOutcome::Expired,
        Ok(None) => RestoreOutcome::NoSession,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable persisted session");
            RestoreOutcome::NoSession
        }
    };

    store.set_state(
        StatePatch::new()
            .status(Status::Idle)
            .identity(None)
            .error(None),
    );
    info!(?outcome, "no usable persisted session");
    outcome
}

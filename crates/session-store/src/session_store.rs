//! Load, save and clear the persisted credential record.

use crate::{KeyValueStorage, StorageKeys, StorageResult};
use inventory_types::User;
use tracing::{debug, warn};

/// Contents of the persisted credential record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

/// High-level API over a key-value backend for the `token` + `user` pair.
pub struct SessionStore {
    storage: Box<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Create a new session store with the given backend.
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Read the persisted record.
    ///
    /// A user snapshot that no longer parses is deleted and reported as
    /// absent; the token is left in place so bootstrap can still revalidate.
    pub fn load(&self) -> StorageResult<StoredSession> {
        let token = self.token()?;

        let user = match self.storage.get(StorageKeys::USER)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Cached user snapshot is corrupt, clearing it");
                    self.storage.delete(StorageKeys::USER)?;
                    None
                }
            },
            None => None,
        };

        Ok(StoredSession { token, user })
    }

    /// Current bearer token, if any. Read on every request by the API client.
    pub fn token(&self) -> StorageResult<Option<String>> {
        Ok(self
            .storage
            .get(StorageKeys::TOKEN)?
            .filter(|token| !token.trim().is_empty()))
    }

    /// Overwrite token and user snapshot together.
    pub fn save(&self, token: &str, user: &User) -> StorageResult<()> {
        let user_json = serde_json::to_string(user)?;
        self.storage.set_many(&[
            (StorageKeys::TOKEN, token),
            (StorageKeys::USER, user_json.as_str()),
        ])?;
        debug!(user_id = user.id, "Persisted session record");
        Ok(())
    }

    /// Remove both fields. Calling it on an empty store is a no-op.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage
            .delete_many(&[StorageKeys::TOKEN, StorageKeys::USER])?;
        debug!("Cleared session record");
        Ok(())
    }
}

use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::cache::{Cache, CacheKey};
use crate::error::StorageError;
use crate::model::{HistoryEntry, SessionProgress};

/// Number of archived sessions kept; older ones are evicted first.
pub const HISTORY_LIMIT: usize = 10;

/// Durable home of the live session and the bounded session history.
pub trait ProgressStore: Send + Sync {
    /// The stored live session, if any. Unreadable entries count as absent.
    fn load(&self) -> Option<SessionProgress>;

    fn save(&self, progress: &SessionProgress) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;

    /// Archive `progress`, keeping at most [`HISTORY_LIMIT`] entries.
    ///
    /// Fails without writing anything if the stored history cannot be read.
    fn append_history(&self, progress: &SessionProgress) -> Result<(), StorageError>;

    /// Archived sessions, oldest first.
    fn list_history(&self) -> Vec<HistoryEntry>;
}

/// [`ProgressStore`] that keeps JSON entries in a [`Cache`].
pub struct CacheProgressStore {
    cache: Arc<dyn Cache>,
    history_lock: Mutex<()>,
}

impl CacheProgressStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache,
            history_lock: Mutex::new(()),
        }
    }

    fn read_history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let key = CacheKey::SessionHistory;
        match self.cache.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
                key: key.as_str().to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }
}

impl ProgressStore for CacheProgressStore {
    fn load(&self) -> Option<SessionProgress> {
        let key = CacheKey::SessionProgress;
        let bytes = match self.cache.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("cannot load session progress: {}", e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(progress) => Some(progress),
            Err(e) => {
                tracing::warn!("ignoring corrupt session progress: {}", e);
                None
            }
        }
    }

    fn save(&self, progress: &SessionProgress) -> Result<(), StorageError> {
        let key = CacheKey::SessionProgress;
        let bytes = serde_json::to_vec(progress).map_err(|source| StorageError::Corrupt {
            key: key.as_str().to_string(),
            source,
        })?;
        self.cache.put(key, &bytes)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.cache.remove(CacheKey::SessionProgress)
    }

    fn append_history(&self, progress: &SessionProgress) -> Result<(), StorageError> {
        let key = CacheKey::SessionHistory;
        let _guard = self.history_lock.lock().map_err(|_| StorageError::WriteFailed {
            key: key.as_str().to_string(),
            reason: "lock poisoned".into(),
        })?;

        // an unreadable history is left as is rather than overwritten
        let mut history = self.read_history().map_err(|e| {
            tracing::warn!("cannot archive session, history unreadable: {}", e);
            e
        })?;
        history.push(HistoryEntry {
            session: progress.clone(),
            completed_at: Utc::now(),
        });
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }

        let bytes = serde_json::to_vec(&history).map_err(|source| StorageError::Corrupt {
            key: key.as_str().to_string(),
            source,
        })?;
        self.cache.put(key, &bytes)?;
        tracing::info!(
            session = %progress.session_id,
            stored = history.len(),
            "archived session to history"
        );
        Ok(())
    }

    fn list_history(&self) -> Vec<HistoryEntry> {
        self.read_history().unwrap_or_else(|e| {
            tracing::warn!("cannot read session history: {}", e);
            Vec::new()
        })
    }
}

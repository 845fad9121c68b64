//! Local key-value cache holding the current questionnaire, the live session
//! and the session history.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Questionnaire,
    SessionProgress,
    SessionHistory,
}

impl CacheKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::Questionnaire => "hquiz_questionnaire",
            CacheKey::SessionProgress => "hquiz_session_progress",
            CacheKey::SessionHistory => "hquiz_sessions_history",
        }
    }
}

/// Synchronous byte storage addressed by [`CacheKey`].
///
/// A `put` must be visible to every later `get` in the same process.
/// Implementations serialize writes per key.
pub trait Cache: Send + Sync {
    fn get(&self, key: CacheKey) -> Result<Option<Vec<u8>>, StorageError>;

    fn put(&self, key: CacheKey, value: &[u8]) -> Result<(), StorageError>;

    fn remove(&self, key: CacheKey) -> Result<(), StorageError>;
}

/// In-process cache; lives as long as the value.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: CacheKey) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self.entries.lock().map_err(|_| read_failed(key, "lock poisoned"))?;
        Ok(entries.get(&key).cloned())
    }

    fn put(&self, key: CacheKey, value: &[u8]) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| write_failed(key, "lock poisoned"))?;
        entries.insert(key, value.to_vec());
        Ok(())
    }

    fn remove(&self, key: CacheKey) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| write_failed(key, "lock poisoned"))?;
        entries.remove(&key);
        Ok(())
    }
}

/// Cache stored as one JSON file per key inside a directory.
#[derive(Debug)]
pub struct DirCache {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DirCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::WriteFailed {
            key: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(dir = %dir.display(), "opened cache directory");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl Cache for DirCache {
    fn get(&self, key: CacheKey) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(read_failed(key, e)),
        }
    }

    fn put(&self, key: CacheKey, value: &[u8]) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| write_failed(key, "lock poisoned"))?;
        atomic_write(&self.path_for(key), value).map_err(|e| write_failed(key, e))
    }

    fn remove(&self, key: CacheKey) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| write_failed(key, "lock poisoned"))?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(write_failed(key, e)),
        }
    }
}

/// Write to a sibling temp file, then rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}

fn read_failed(key: CacheKey, reason: impl ToString) -> StorageError {
    StorageError::ReadFailed {
        key: key.as_str().to_string(),
        reason: reason.to_string(),
    }
}

fn write_failed(key: CacheKey, reason: impl ToString) -> StorageError {
    StorageError::WriteFailed {
        key: key.as_str().to_string(),
        reason: reason.to_string(),
    }
}

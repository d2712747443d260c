//! Key/value storage round-trip check

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use directories::ProjectDirs;
use tracing::debug;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::health::check::{CheckResult, CheckValue, SelfCheck};
use crate::health::error::CheckError;

/// Minimal persistence surface the storage check exercises
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), CheckError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CheckError>;

    /// Removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), CheckError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CheckError> {
        self.entries
            .lock()
            .map_err(|e| CheckError::Storage(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), CheckError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CheckError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<(), CheckError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the configured directory, else the platform data directory,
    /// else a directory under the system temp dir
    pub fn from_config(config: &StorageConfig) -> Self {
        let dir = config.dir.clone().unwrap_or_else(|| {
            ProjectDirs::from("dev", "selfcheck", "selfcheck")
                .map(|dirs| dirs.data_dir().join("store"))
                .unwrap_or_else(|| std::env::temp_dir().join("selfcheck-store"))
        });
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, CheckError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(CheckError::Storage(format!("invalid key {key:?}")));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), CheckError> {
        let path = self.key_path(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CheckError> {
        let path = self.key_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), CheckError> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes a marker value, reads it back, and removes it
///
/// Store failures surface as errors; a value that reads back wrong is a
/// self-reported failure.
pub struct StorageCheck<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> StorageCheck<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl<S: KeyValueStore> SelfCheck for StorageCheck<S> {
    fn name(&self) -> &str {
        "Storage"
    }

    fn description(&self) -> Option<&str> {
        Some("Writes, reads back and removes a marker key")
    }

    async fn run(&self) -> CheckResult {
        let marker = format!("selfcheck-{}", Uuid::new_v4());
        self.store.set(&self.key, &marker).await?;

        // Remove runs even when the read fails
        let read_back = self.store.get(&self.key).await;
        let removed = self.store.remove(&self.key).await;
        let read_back = read_back?;
        removed?;

        debug!(key = %self.key, "Storage round trip completed");
        match read_back {
            Some(value) if value == marker => Ok(CheckValue::ok("OK")),
            Some(_) => Ok(CheckValue::failed("Read back a different value")),
            None => Ok(CheckValue::failed("Value missing after write")),
        }
    }
}

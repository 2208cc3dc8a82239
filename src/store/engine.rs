//! Storage engines holding serialized snapshots

use crate::store::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Key/value backend for queue snapshots
///
/// Values are opaque strings; `QueueStore` decides the encoding. A missing
/// key is not an error: `get_item` returns `None` and `remove_item` does
/// nothing.
#[async_trait]
pub trait StoreEngine: Send + Sync {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set_item(&self, key: &str, data: String) -> StoreResult<()>;

    async fn remove_item(&self, key: &str) -> StoreResult<()>;
}

/// In-process engine
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl StoreEngine for MemoryStore {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, data: String) -> StoreResult<()> {
        self.items.lock().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}

/// Engine keeping one `<key>.json` file per store key
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `queuelink` under the platform data directory
    pub fn default_location() -> StoreResult<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| StoreError::Unavailable {
            message: "no data directory on this platform".to_string(),
        })?;
        Ok(Self::new(data_dir.join("queuelink")))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let invalid = key.is_empty()
            || key == "."
            || key == ".."
            || key.chars().any(|c| std::path::is_separator(c) || c.is_control());
        if invalid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl StoreEngine for FileStore {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    async fn set_item(&self, key: &str, data: String) -> StoreResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(io_error(key))?;

        // Write then rename so a crash never leaves a truncated snapshot
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, data)
            .await
            .map_err(io_error(key))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(io_error(key))?;

        log::trace!("Wrote store key '{}' to {}", key, path.display());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key)(e)),
        }
    }
}

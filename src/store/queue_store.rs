//! Persisting and replaying a link's queue

use crate::config::api::StoreConfig;
use crate::core::error_handling::log_error_with_context;
use crate::link::api::{Client, LinkError, QueueLink, SerializedOperation};
use crate::store::engine::{FileStore, StoreEngine};
use crate::store::error::{StoreError, StoreResult};
use std::sync::Arc;

/// Outcome of replaying a stored snapshot
///
/// Restoring never fails as a whole: an unreadable store is reported in
/// `store_error` and an entry that cannot be rebuilt lands in `failed`.
#[derive(Debug)]
pub struct RestoreReport<R> {
    /// Client responses for the re-issued operations, in snapshot order
    pub restored: Vec<R>,
    pub failed: Vec<LinkError>,
    pub store_error: Option<StoreError>,
}

impl<R> Default for RestoreReport<R> {
    fn default() -> Self {
        Self {
            restored: Vec::new(),
            failed: Vec::new(),
            store_error: None,
        }
    }
}

impl<R> RestoreReport<R> {
    /// True if the store was read and every entry was re-issued
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.store_error.is_none()
    }
}

/// A queue snapshot under one key of a [`StoreEngine`]
#[derive(Clone)]
pub struct QueueStore {
    engine: Arc<dyn StoreEngine>,
    store_key: String,
}

impl QueueStore {
    pub fn new(engine: Arc<dyn StoreEngine>, store_key: impl Into<String>) -> Self {
        Self {
            engine,
            store_key: store_key.into(),
        }
    }

    /// File-backed store as described by a `[store]` config table
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let engine = match &config.directory {
            Some(directory) => FileStore::new(directory),
            None => FileStore::default_location()?,
        };
        log::debug!(
            "Queue snapshots for '{}' stored in {}",
            config.store_key,
            engine.directory().display()
        );
        Ok(Self::new(Arc::new(engine), config.store_key.clone()))
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    /// Write the operations currently held by `link`
    ///
    /// Returns the number of operations written.
    pub async fn persist(&self, link: &QueueLink) -> StoreResult<usize> {
        let entries = link.extract();
        self.save(&entries).await?;
        Ok(entries.len())
    }

    pub async fn save(&self, entries: &[SerializedOperation]) -> StoreResult<()> {
        let data = serde_json::to_string(entries).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;
        self.engine.set_item(&self.store_key, data).await?;
        log::debug!(
            "Persisted {} queued operations under '{}'",
            entries.len(),
            self.store_key
        );
        Ok(())
    }

    /// Read the stored snapshot; an absent key is an empty snapshot
    pub async fn load(&self) -> StoreResult<Vec<SerializedOperation>> {
        let Some(data) = self.engine.get_item(&self.store_key).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&data).map_err(|e| StoreError::MalformedSnapshot {
            key: self.store_key.clone(),
            message: e.to_string(),
        })
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.engine.remove_item(&self.store_key).await
    }

    /// Re-issue the stored snapshot on `client` and drop it from the store
    ///
    /// Failures are logged and collected in the report rather than
    /// returned. The snapshot is kept if it could not be read, so a later
    /// attempt can still recover it. Entries that could not be rebuilt are
    /// written back under the same key; the replayed ones are removed.
    pub async fn restore_into<C>(&self, client: &C) -> RestoreReport<C::Response>
    where
        C: Client + ?Sized,
    {
        let mut report = RestoreReport::default();

        let entries = match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                log_error_with_context(&e, "Loading queued operations");
                report.store_error = Some(e);
                return report;
            }
        };
        if entries.is_empty() {
            return report;
        }

        let mut unrestored = Vec::new();
        for (entry, result) in entries.iter().zip(QueueLink::restore(client, &entries)) {
            match result {
                Ok(response) => report.restored.push(response),
                Err(e) => {
                    log_error_with_context(&e, "Restoring queued operation");
                    report.failed.push(e);
                    unrestored.push(entry.clone());
                }
            }
        }
        log::info!(
            "Restored {} of {} queued operations from '{}'",
            report.restored.len(),
            entries.len(),
            self.store_key
        );

        let remaining = if unrestored.is_empty() {
            self.clear().await
        } else {
            self.save(&unrestored).await
        };
        if let Err(e) = remaining {
            log_error_with_context(&e, "Updating replayed queue snapshot");
            report.store_error = Some(e);
        }
        report
    }
}

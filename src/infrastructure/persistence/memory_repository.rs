//! In-process repository, optionally persisted to a snapshot file.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::snapshot_file::SnapshotFile;
use crate::domain::entities::{Conversion, History, HistoryEntry, NewConversion, UserId};
use crate::domain::repositories::ConversionRepository;
use crate::error::StorageError;

#[derive(Debug, Default)]
struct ConversionTables {
    urls: BTreeMap<String, String>,
    deleted: BTreeMap<String, bool>,
    by_original: HashMap<String, String>,
    histories: HashMap<UserId, History>,
}

impl ConversionTables {
    fn insert(&mut self, short_code: &str, original_url: &str) -> Result<(), StorageError> {
        if self.urls.contains_key(short_code) {
            return Err(StorageError::Duplicate(short_code.to_string()));
        }

        self.urls
            .insert(short_code.to_string(), original_url.to_string());
        self.deleted.insert(short_code.to_string(), false);
        self.by_original
            .entry(original_url.to_string())
            .or_insert_with(|| short_code.to_string());

        Ok(())
    }

    /// Undoes an [`insert`](Self::insert) whose persistence failed.
    fn remove(&mut self, short_code: &str) {
        if let Some(url) = self.urls.remove(short_code)
            && self.by_original.get(&url).is_some_and(|c| c == short_code)
        {
            self.by_original.remove(&url);
        }
        self.deleted.remove(short_code);
    }

    fn record_history(&mut self, user_id: UserId, short_code: &str, original_url: &str) {
        self.histories
            .entry(user_id)
            .or_default()
            .insert(HistoryEntry::new(short_code, original_url));
    }

    fn conversion(&self, short_code: &str) -> Option<Conversion> {
        self.urls.get(short_code).map(|url| Conversion {
            short_code: short_code.to_string(),
            original_url: url.clone(),
            deleted: self.deleted.get(short_code).copied().unwrap_or(false),
        })
    }
}

/// Repository keeping every table in process memory.
///
/// Built with [`MemoryRepository::open_file`], it also mirrors the conversion and
/// deleted-flag tables to a [`SnapshotFile`], rewriting the whole file after each
/// mutation. User history is never written to the file.
///
/// All mutations run under the table write lock, so snapshot rewrites never
/// interleave and readers never observe a half-applied write.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<ConversionTables>,
    snapshot: Option<Mutex<SnapshotFile>>,
}

impl MemoryRepository {
    /// Creates a repository without persistence.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed repository, loading any existing snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be opened and
    /// [`StorageError::Serialization`] if its contents are malformed.
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let (snapshot, data) = SnapshotFile::open(path).await?;

        let mut tables = ConversionTables::default();
        for (code, url) in &data.urls {
            tables
                .by_original
                .entry(url.clone())
                .or_insert_with(|| code.clone());
            let deleted = data.deleted.get(code).copied().unwrap_or(false);
            tables.deleted.insert(code.clone(), deleted);
        }
        tables.urls = data.urls;

        info!(
            path = %snapshot.path().display(),
            codes = tables.urls.len(),
            "File storage opened"
        );

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot: Some(Mutex::new(snapshot)),
        })
    }

    /// Returns true if mutations are mirrored to a file.
    pub fn is_persistent(&self) -> bool {
        self.snapshot.is_some()
    }

    async fn persist(&self, tables: &ConversionTables) -> Result<(), StorageError> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };

        snapshot
            .lock()
            .await
            .rewrite(&tables.urls, &tables.deleted)
            .await
    }

    async fn insert_one(
        &self,
        tables: &mut ConversionTables,
        original_url: &str,
        short_code: &str,
        user_id: UserId,
    ) -> Result<(), StorageError> {
        tables.insert(short_code, original_url)?;

        if let Err(e) = self.persist(tables).await {
            warn!(error = %e, short_code, "Snapshot rewrite failed, rolling back insert");
            tables.remove(short_code);
            return Err(e);
        }

        tables.record_history(user_id, short_code, original_url);
        Ok(())
    }
}

#[async_trait]
impl ConversionRepository for MemoryRepository {
    async fn add_item(
        &self,
        original_url: &str,
        short_code: &str,
        user_id: UserId,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        match self
            .insert_one(&mut tables, original_url, short_code, user_id)
            .await
        {
            Ok(()) => {
                debug!(short_code, original_url, %user_id, "Item added");
                Ok(())
            }
            Err(e) => {
                debug!(short_code, original_url, %user_id, error = %e, "Item rejected");
                Err(e)
            }
        }
    }

    /// Inserts items one by one and stops at the first failure.
    ///
    /// Items before the failing one stay applied.
    async fn add_batch_items(
        &self,
        items: &[NewConversion],
        user_id: UserId,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        for (index, item) in items.iter().enumerate() {
            if let Err(e) = self
                .insert_one(&mut tables, &item.original_url, &item.short_code, user_id)
                .await
            {
                warn!(
                    applied = index,
                    total = items.len(),
                    error = %e,
                    "Batch insert stopped"
                );
                return Err(e);
            }
        }

        debug!(count = items.len(), %user_id, "Batch added");
        Ok(())
    }

    async fn get_item(&self, short_code: &str) -> Result<Conversion, StorageError> {
        self.tables
            .read()
            .await
            .conversion(short_code)
            .ok_or_else(|| StorageError::NotFound(short_code.to_string()))
    }

    async fn get_item_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Conversion, StorageError> {
        let tables = self.tables.read().await;

        tables
            .by_original
            .get(original_url)
            .and_then(|code| tables.conversion(code))
            .ok_or_else(|| StorageError::NotFound(original_url.to_string()))
    }

    async fn mark_delete_batch(&self, short_codes: &[String]) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        let mut changed = Vec::new();
        for code in short_codes {
            if let Some(flag) = tables.deleted.get_mut(code)
                && !*flag
            {
                *flag = true;
                changed.push(code.as_str());
            }
        }

        if changed.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.persist(&tables).await {
            warn!(error = %e, "Snapshot rewrite failed, rolling back delete marks");
            for code in changed {
                tables.deleted.insert(code.to_string(), false);
            }
            return Err(e);
        }

        debug!(count = changed.len(), "Items marked deleted");
        Ok(())
    }

    async fn get_user_history(&self, user_id: UserId) -> Result<History, StorageError> {
        match self.tables.read().await.histories.get(&user_id) {
            Some(history) if !history.is_empty() => Ok(history.clone()),
            _ => Err(StorageError::EmptyResult),
        }
    }

    async fn close(&self) -> Result<(), StorageError> {
        if let Some(snapshot) = &self.snapshot {
            snapshot.lock().await.sync().await?;
            info!("File storage closed");
        }
        Ok(())
    }
}

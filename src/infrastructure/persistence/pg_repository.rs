//! PostgreSQL implementation of the conversion repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, warn};

use crate::domain::entities::{Conversion, History, HistoryEntry, NewConversion, UserId};
use crate::domain::repositories::ConversionRepository;
use crate::error::{StorageError, is_unique_violation, map_sqlx_error};

/// PostgreSQL repository.
///
/// Conversions live in `conversions(short_code PRIMARY KEY, original_url, deleted)`.
/// Each user's history is one text blob in `histories(user_id PRIMARY KEY, history)`,
/// parsed and rewritten wholesale on every update (see [`History::to_blob`]).
///
/// Batch inserts run in a single transaction bounded by `batch_timeout`, so a
/// failed or timed out batch leaves nothing applied.
pub struct PgRepository {
    pool: Arc<PgPool>,
    batch_timeout: Duration,
}

impl PgRepository {
    /// Default time budget for a batch insert.
    pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(2);

    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            batch_timeout: Self::DEFAULT_BATCH_TIMEOUT,
        }
    }

    /// Overrides the batch insert time budget.
    pub fn with_batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }

    async fn insert_conversion(
        tx: &mut Transaction<'_, Postgres>,
        original_url: &str,
        short_code: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO conversions (short_code, original_url, deleted) VALUES ($1, $2, FALSE)",
        )
        .bind(short_code)
        .bind(original_url)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Duplicate(short_code.to_string())
            } else {
                map_sqlx_error(e)
            }
        })?;

        Ok(())
    }

    /// Merges entries into the user's history blob under a row lock.
    async fn append_history(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        entries: impl IntoIterator<Item = HistoryEntry>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO histories (user_id, history) VALUES ($1, '') ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id.as_i64())
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        let blob: String =
            sqlx::query_scalar("SELECT history FROM histories WHERE user_id = $1 FOR UPDATE")
                .bind(user_id.as_i64())
                .fetch_one(&mut **tx)
                .await
                .map_err(map_sqlx_error)?;

        let mut history = History::from_blob(&blob)?;
        let mut changed = false;
        for entry in entries {
            changed |= history.insert(entry);
        }

        if changed {
            sqlx::query("UPDATE histories SET history = $1 WHERE user_id = $2")
                .bind(history.to_blob())
                .bind(user_id.as_i64())
                .execute(&mut **tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        Ok(())
    }

    async fn insert_batch(
        &self,
        items: &[NewConversion],
        user_id: UserId,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for item in items {
            Self::insert_conversion(&mut tx, &item.original_url, &item.short_code).await?;
        }

        let entries = items
            .iter()
            .map(|item| HistoryEntry::new(&item.short_code, &item.original_url));
        Self::append_history(&mut tx, user_id, entries).await?;

        tx.commit().await.map_err(map_sqlx_error)
    }

    fn conversion_from_row(row: &sqlx::postgres::PgRow) -> Result<Conversion, StorageError> {
        Ok(Conversion {
            short_code: row.try_get("short_code").map_err(map_sqlx_error)?,
            original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
            deleted: row.try_get("deleted").map_err(map_sqlx_error)?,
        })
    }
}

#[async_trait]
impl ConversionRepository for PgRepository {
    async fn add_item(
        &self,
        original_url: &str,
        short_code: &str,
        user_id: UserId,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        Self::insert_conversion(&mut tx, original_url, short_code).await?;
        Self::append_history(
            &mut tx,
            user_id,
            [HistoryEntry::new(short_code, original_url)],
        )
        .await?;

        tx.commit().await.map_err(map_sqlx_error)?;

        debug!(short_code, original_url, %user_id, "Item added");
        Ok(())
    }

    async fn add_batch_items(
        &self,
        items: &[NewConversion],
        user_id: UserId,
    ) -> Result<(), StorageError> {
        if items.is_empty() {
            return Ok(());
        }

        match tokio::time::timeout(self.batch_timeout, self.insert_batch(items, user_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    count = items.len(),
                    timeout_ms = self.batch_timeout.as_millis() as u64,
                    "Batch insert abandoned"
                );
                Err(StorageError::Timeout(format!(
                    "batch of {} items exceeded {:?}",
                    items.len(),
                    self.batch_timeout
                )))
            }
        }
    }

    async fn get_item(&self, short_code: &str) -> Result<Conversion, StorageError> {
        let row = sqlx::query(
            "SELECT short_code, original_url, deleted FROM conversions WHERE short_code = $1",
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Self::conversion_from_row(&row),
            None => Err(StorageError::NotFound(short_code.to_string())),
        }
    }

    async fn get_item_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Conversion, StorageError> {
        let row = sqlx::query(
            "SELECT short_code, original_url, deleted FROM conversions WHERE original_url = $1 LIMIT 1",
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Self::conversion_from_row(&row),
            None => Err(StorageError::NotFound(original_url.to_string())),
        }
    }

    async fn mark_delete_batch(&self, short_codes: &[String]) -> Result<(), StorageError> {
        if short_codes.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            "UPDATE conversions SET deleted = TRUE WHERE short_code = ANY($1) AND deleted = FALSE",
        )
        .bind(short_codes.to_vec())
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        debug!(
            requested = short_codes.len(),
            marked = result.rows_affected(),
            "Items marked deleted"
        );
        Ok(())
    }

    async fn get_user_history(&self, user_id: UserId) -> Result<History, StorageError> {
        let blob: Option<String> =
            sqlx::query_scalar("SELECT history FROM histories WHERE user_id = $1")
                .bind(user_id.as_i64())
                .fetch_optional(self.pool.as_ref())
                .await
                .map_err(map_sqlx_error)?;

        let history = match blob {
            Some(blob) => History::from_blob(&blob)?,
            None => return Err(StorageError::EmptyResult),
        };

        if history.is_empty() {
            return Err(StorageError::EmptyResult);
        }
        Ok(history)
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        debug!("Database pool closed");
        Ok(())
    }
}

//! Repository trait for conversion storage.

use crate::domain::entities::{Conversion, History, NewConversion, UserId};
use crate::error::StorageError;
use async_trait::async_trait;

/// Storage contract shared by the in-memory, file-backed and PostgreSQL backends.
///
/// The short code is the uniqueness key. A record that exists, deleted or not,
/// blocks any further insert of the same code.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryRepository`] - In-memory, optionally snapshotted to a file
/// - [`crate::infrastructure::persistence::PgRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversionRepository: Send + Sync {
    /// Inserts a conversion and records it in the user's history.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Duplicate`] if the short code already exists.
    /// A concurrent duplicate never overwrites the stored mapping.
    async fn add_item(
        &self,
        original_url: &str,
        short_code: &str,
        user_id: UserId,
    ) -> Result<(), StorageError>;

    /// Inserts several conversions for one user.
    ///
    /// Backends document whether a failure leaves earlier items applied.
    async fn add_batch_items(
        &self,
        items: &[NewConversion],
        user_id: UserId,
    ) -> Result<(), StorageError>;

    /// Looks a conversion up by short code.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no record has this code.
    async fn get_item(&self, short_code: &str) -> Result<Conversion, StorageError>;

    /// Looks a conversion up by its original URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no record has this URL.
    async fn get_item_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Conversion, StorageError>;

    /// Flags every listed code that exists as deleted.
    ///
    /// Unknown and already deleted codes are ignored.
    async fn mark_delete_batch(&self, short_codes: &[String]) -> Result<(), StorageError>;

    /// Returns the user's history.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyResult`] if the user has no entries.
    async fn get_user_history(&self, user_id: UserId) -> Result<History, StorageError>;

    /// Releases the underlying file handle or connection pool.
    async fn close(&self) -> Result<(), StorageError>;
}

//! Short URL creation, resolution, history and deletion.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::delete_worker::{DeleteWorkerSettings, run_delete_worker};
use crate::domain::entities::{NewConversion, UserId};
use crate::domain::repositories::ConversionRepository;
use crate::error::{AppError, StorageError};
use crate::utils::codec::{short_code, short_url};

/// Result of a single create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    /// Fully qualified short URL.
    pub short_url: String,
    /// `false` when the URL was already stored and the existing mapping is returned.
    pub created: bool,
}

/// A history entry with its code expanded into a full URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

/// Orchestrates the codec and the repository.
///
/// Holds no mutable state of its own: everything persistent lives in the
/// repository, and `base_url` is only used to format output.
pub struct ShortenerService<R: ConversionRepository + ?Sized> {
    repository: Arc<R>,
    base_url: String,
    delete_settings: DeleteWorkerSettings,
}

impl<R: ConversionRepository + ?Sized + 'static> ShortenerService<R> {
    /// Creates a new shortener service.
    pub fn new(repository: Arc<R>, base_url: impl Into<String>) -> Self {
        Self {
            repository,
            base_url: base_url.into(),
            delete_settings: DeleteWorkerSettings::default(),
        }
    }

    /// Overrides the limits used by background deletion.
    pub fn with_delete_settings(mut self, delete_settings: DeleteWorkerSettings) -> Self {
        self.delete_settings = delete_settings;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Shortens a URL for a user.
    ///
    /// If the code is already stored, the existing mapping is returned with
    /// `created: false` and the user's history is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is taken by a different URL
    /// (a checksum collision).
    /// Returns [`AppError::Internal`] on storage failures.
    pub async fn create_short_url(
        &self,
        original_url: &str,
        user_id: UserId,
    ) -> Result<Shortened, AppError> {
        let code = short_code(original_url);

        match self.repository.add_item(original_url, &code, user_id).await {
            Ok(()) => {
                info!(short_code = %code, %user_id, "Short URL created");
                Ok(Shortened {
                    short_url: short_url(&self.base_url, &code),
                    created: true,
                })
            }
            Err(StorageError::Duplicate(_)) => {
                let existing = match self
                    .repository
                    .get_item_by_original_url(original_url)
                    .await
                {
                    Ok(existing) => existing,
                    Err(StorageError::NotFound(_)) => {
                        return Err(AppError::conflict(
                            "Short code is taken by another URL",
                            json!({ "code": code, "url": original_url }),
                        ));
                    }
                    Err(e) => return Err(e.into()),
                };

                debug!(short_code = %existing.short_code, "Short URL already exists");
                Ok(Shortened {
                    short_url: short_url(&self.base_url, &existing.short_code),
                    created: false,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Shortens several URLs for a user, preserving input order.
    ///
    /// # Errors
    ///
    /// Any failure aborts the whole result. With the in-memory and file backends
    /// the items stored before the failure stay stored.
    pub async fn create_short_urls(
        &self,
        original_urls: &[String],
        user_id: UserId,
    ) -> Result<Vec<String>, AppError> {
        let items: Vec<NewConversion> = original_urls
            .iter()
            .map(|url| NewConversion::new(url.as_str(), short_code(url)))
            .collect();

        self.repository.add_batch_items(&items, user_id).await?;

        info!(count = items.len(), %user_id, "Short URL batch created");
        Ok(items
            .iter()
            .map(|item| short_url(&self.base_url, &item.short_code))
            .collect())
    }

    /// Resolves a short code to its original URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes and [`AppError::Gone`]
    /// for soft-deleted ones.
    pub async fn resolve_short_url(&self, code: &str) -> Result<String, AppError> {
        let conversion = match self.repository.get_item(code).await {
            Ok(conversion) => conversion,
            Err(StorageError::NotFound(_)) => {
                return Err(AppError::not_found(
                    "Short URL not found",
                    json!({ "code": code }),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if conversion.is_deleted() {
            return Err(AppError::gone(
                "Short URL has been deleted",
                json!({ "code": code }),
            ));
        }

        Ok(conversion.original_url)
    }

    /// Lists the user's conversions with codes expanded into full short URLs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Empty`] if the user has no history.
    pub async fn get_history_for_user(&self, user_id: UserId) -> Result<Vec<UserUrl>, AppError> {
        let history = self.repository.get_user_history(user_id).await?;

        Ok(history
            .into_iter()
            .map(|entry| UserUrl {
                short_url: short_url(&self.base_url, &entry.short_code),
                original_url: entry.original_url,
            })
            .collect())
    }

    /// Marks codes deleted without any ownership check.
    ///
    /// Callers are expected to have verified ownership already.
    pub async fn mark_deleted(&self, short_codes: &[String]) -> Result<(), AppError> {
        self.repository.mark_delete_batch(short_codes).await?;
        Ok(())
    }

    /// Starts background deletion of the user's codes and returns immediately.
    ///
    /// Only codes found in the user's history are marked. The returned handle
    /// may be dropped; the work runs to completion either way.
    pub fn schedule_deletion(&self, short_codes: Vec<String>, user_id: UserId) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let settings = self.delete_settings;

        debug!(count = short_codes.len(), %user_id, "Deletion scheduled");

        tokio::spawn(async move {
            run_delete_worker(repository, short_codes, user_id, settings).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Conversion, History, HistoryEntry};
    use crate::domain::repositories::MockConversionRepository;
    use crate::infrastructure::persistence::MemoryRepository;

    const BASE: &str = "http://localhost:8080";
    const USER: UserId = UserId(42);

    fn service(mock: MockConversionRepository) -> ShortenerService<MockConversionRepository> {
        ShortenerService::new(Arc::new(mock), BASE)
    }

    #[tokio::test]
    async fn test_create_short_url_success() {
        let mut mock = MockConversionRepository::new();
        mock.expect_add_item()
            .withf(|url, code, user| url == "yandex.com" && code == "1389853602" && *user == USER)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let result = service(mock)
            .create_short_url("yandex.com", USER)
            .await
            .unwrap();

        assert_eq!(
            result,
            Shortened {
                short_url: "http://localhost:8080/1389853602".to_string(),
                created: true,
            }
        );
    }

    #[tokio::test]
    async fn test_create_short_url_duplicate_returns_existing() {
        let mut mock = MockConversionRepository::new();
        mock.expect_add_item()
            .times(1)
            .returning(|_, code, _| Err(StorageError::Duplicate(code.to_string())));
        mock.expect_get_item_by_original_url()
            .withf(|url| url == "yandex.com")
            .times(1)
            .returning(|url| Ok(Conversion::new("1389853602", url)));

        let result = service(mock)
            .create_short_url("yandex.com", USER)
            .await
            .unwrap();

        assert!(!result.created);
        assert_eq!(result.short_url, "http://localhost:8080/1389853602");
    }

    #[tokio::test]
    async fn test_create_short_url_collision_is_conflict() {
        let mut mock = MockConversionRepository::new();
        mock.expect_add_item()
            .returning(|_, code, _| Err(StorageError::Duplicate(code.to_string())));
        mock.expect_get_item_by_original_url()
            .returning(|url| Err(StorageError::NotFound(url.to_string())));

        let result = service(mock).create_short_url("yandex.com", USER).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_short_url_storage_failure() {
        let mut mock = MockConversionRepository::new();
        mock.expect_add_item()
            .returning(|_, _, _| Err(StorageError::Database("connection reset".to_string())));
        mock.expect_get_item_by_original_url().times(0);

        let result = service(mock).create_short_url("yandex.com", USER).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_create_short_urls_keeps_order() {
        let mut mock = MockConversionRepository::new();
        mock.expect_add_batch_items()
            .withf(|items, _| {
                items
                    == [
                        NewConversion::new("stackoverflow.com", "2177322106"),
                        NewConversion::new("go.dev", "294555335"),
                    ]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let urls = service(mock)
            .create_short_urls(&["stackoverflow.com".to_string(), "go.dev".to_string()], USER)
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "http://localhost:8080/2177322106".to_string(),
                "http://localhost:8080/294555335".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_short_urls_duplicate_aborts() {
        let mut mock = MockConversionRepository::new();
        mock.expect_add_batch_items()
            .returning(|_, _| Err(StorageError::Duplicate("294555335".to_string())));

        let result = service(mock)
            .create_short_urls(&["go.dev".to_string()], USER)
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_resolve_outcomes() {
        let mut mock = MockConversionRepository::new();
        mock.expect_get_item().returning(|code| match code {
            "1389853602" => Ok(Conversion::new("1389853602", "yandex.com")),
            "3201241320" => Ok(Conversion {
                deleted: true,
                ..Conversion::new("3201241320", "ya.ru")
            }),
            other => Err(StorageError::NotFound(other.to_string())),
        });
        let service = service(mock);

        assert_eq!(
            service.resolve_short_url("1389853602").await.unwrap(),
            "yandex.com"
        );
        assert!(matches!(
            service.resolve_short_url("3201241320").await,
            Err(AppError::Gone { .. })
        ));
        assert!(matches!(
            service.resolve_short_url("0").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_history_expands_codes() {
        let mut mock = MockConversionRepository::new();
        mock.expect_get_user_history().returning(|_| {
            Ok([HistoryEntry::new("1389853602", "yandex.com")]
                .into_iter()
                .collect::<History>())
        });

        let history = service(mock).get_history_for_user(USER).await.unwrap();

        assert_eq!(
            history,
            vec![UserUrl {
                short_url: "http://localhost:8080/1389853602".to_string(),
                original_url: "yandex.com".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_history_empty() {
        let mut mock = MockConversionRepository::new();
        mock.expect_get_user_history()
            .returning(|_| Err(StorageError::EmptyResult));

        let result = service(mock).get_history_for_user(USER).await;

        assert!(matches!(result, Err(AppError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_resubmission_does_not_duplicate_history() {
        let service = ShortenerService::new(Arc::new(MemoryRepository::in_memory()), BASE);

        let first = service.create_short_url("yandex.com", USER).await.unwrap();
        let second = service.create_short_url("yandex.com", USER).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.short_url, second.short_url);
        assert_eq!(service.get_history_for_user(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_deleted_then_resolve_is_gone() {
        let service = ShortenerService::new(Arc::new(MemoryRepository::in_memory()), BASE);
        service.create_short_url("yandex.com", USER).await.unwrap();

        service
            .mark_deleted(&["1389853602".to_string(), "never-stored".to_string()])
            .await
            .unwrap();

        assert!(matches!(
            service.resolve_short_url("1389853602").await,
            Err(AppError::Gone { .. })
        ));
    }

    #[tokio::test]
    async fn test_schedule_deletion_runs_in_background() {
        let service = ShortenerService::new(Arc::new(MemoryRepository::in_memory()), BASE);
        service.create_short_url("go.dev", USER).await.unwrap();

        service
            .schedule_deletion(vec!["294555335".to_string()], USER)
            .await
            .unwrap();

        assert!(matches!(
            service.resolve_short_url("294555335").await,
            Err(AppError::Gone { .. })
        ));
    }
}

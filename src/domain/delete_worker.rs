//! Background soft-delete pipeline.
//!
//! A delete request is acknowledged before any work happens. The worker then
//! checks every requested code in its own task: the code must be in the
//! requesting user's history and must still exist. Verified codes are sent
//! through a channel to a collector that issues a single
//! [`ConversionRepository::mark_delete_batch`] call. Failures are logged and
//! never retried.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::entities::UserId;
use crate::domain::repositories::ConversionRepository;
use crate::error::StorageError;

/// Limits applied to one deletion run.
#[derive(Debug, Clone, Copy)]
pub struct DeleteWorkerSettings {
    /// Maximum number of ownership checks in flight.
    pub concurrency: usize,
    /// Time budget for a single ownership check.
    pub check_timeout: Duration,
}

impl Default for DeleteWorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            check_timeout: Duration::from_secs(2),
        }
    }
}

/// Verifies ownership of `short_codes` for `user_id` and marks the verified ones deleted.
///
/// Returns the codes that were submitted for marking.
pub async fn run_delete_worker<R>(
    repository: Arc<R>,
    short_codes: Vec<String>,
    user_id: UserId,
    settings: DeleteWorkerSettings,
) -> Vec<String>
where
    R: ConversionRepository + ?Sized + 'static,
{
    let requested = short_codes.len();
    let (verified_tx, mut verified_rx) = mpsc::channel::<String>(requested.max(1));
    let permits = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut checks = JoinSet::new();

    for code in short_codes {
        let repository = repository.clone();
        let permits = permits.clone();
        let verified_tx = verified_tx.clone();

        checks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            let outcome = tokio::time::timeout(
                settings.check_timeout,
                is_deletable(repository.as_ref(), &code, user_id),
            )
            .await;

            match outcome {
                Ok(Ok(true)) => {
                    if verified_tx.send(code).await.is_err() {
                        warn!(%user_id, "Delete collector closed early");
                    }
                }
                Ok(Ok(false)) => {
                    debug!(%user_id, short_code = %code, "Delete rejected: not owned or missing");
                }
                Ok(Err(e)) => {
                    warn!(%user_id, short_code = %code, error = %e, "Ownership check failed");
                }
                Err(_) => {
                    warn!(%user_id, short_code = %code, "Ownership check timed out");
                }
            }
        });
    }
    drop(verified_tx);

    let mut verified = Vec::with_capacity(requested);
    while let Some(code) = verified_rx.recv().await {
        verified.push(code);
    }

    while let Some(joined) = checks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Ownership check task panicked");
        }
    }

    if verified.is_empty() {
        debug!(%user_id, requested, "Nothing to delete");
        return verified;
    }

    match repository.mark_delete_batch(&verified).await {
        Ok(()) => info!(%user_id, requested, marked = verified.len(), "Delete batch applied"),
        Err(e) => error!(%user_id, error = %e, "Delete batch failed"),
    }

    verified
}

async fn is_deletable<R>(
    repository: &R,
    short_code: &str,
    user_id: UserId,
) -> Result<bool, StorageError>
where
    R: ConversionRepository + ?Sized,
{
    let owned = match repository.get_user_history(user_id).await {
        Ok(history) => history.contains_code(short_code),
        Err(StorageError::EmptyResult) => false,
        Err(e) => return Err(e),
    };
    if !owned {
        return Ok(false);
    }

    match repository.get_item(short_code).await {
        Ok(_) => Ok(true),
        Err(StorageError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

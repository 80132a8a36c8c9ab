//! Handlers for the caller's own URLs.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::api::dto::user_urls::{DeleteUrlsRequest, UserUrlItem};
use crate::domain::entities::UserId;
use crate::error::AppError;
use crate::state::AppState;

/// Lists every URL the caller has shortened.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response
///
/// `200 OK` with `[{ "short_url": "...", "original_url": "..." }]`, or
/// `204 No Content` if the caller has no history.
pub async fn user_urls_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<UserUrlItem>>, AppError> {
    let urls = state.shortener.get_history_for_user(user_id).await?;

    Ok(Json(urls.into_iter().map(UserUrlItem::from).collect()))
}

/// Schedules deletion of the caller's short codes.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["1389853602", "3201241320"]
/// ```
///
/// Answers `202 Accepted` immediately. Codes the caller does not own are
/// silently skipped by the background worker.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<DeleteUrlsRequest>,
) -> StatusCode {
    let _ = state.shortener.schedule_deletion(payload.codes, user_id);
    StatusCode::ACCEPTED
}

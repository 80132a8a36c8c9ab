//! Handlers for the shortening endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{
    BatchResponseItem, BatchShortenRequest, ShortenRequest, ShortenResponse,
};
use crate::domain::entities::UserId;
use crate::error::AppError;
use crate::state::AppState;

fn status_for(created: bool) -> StatusCode {
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

/// Shortens a URL sent as plain text.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response
///
/// `201 Created` with the short URL as `text/plain`, or `409 Conflict` with the
/// already existing short URL.
///
/// # Errors
///
/// Returns 400 Bad Request if the body is empty.
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::bad_request(
            "Request body must contain a URL",
            json!({}),
        ));
    }

    let shortened = state.shortener.create_short_url(&body, user_id).await?;

    Ok((
        status_for(shortened.created),
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        shortened.short_url,
    ))
}

/// Shortens a URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/1389853602" }
/// ```
///
/// Status is `201 Created` for a new mapping and `409 Conflict` if the URL was
/// already shortened; the body carries the short URL in both cases.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<ShortenRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let shortened = state
        .shortener
        .create_short_url(&payload.url, user_id)
        .await?;

    Ok((
        status_for(shortened.created),
        Json(ShortenResponse {
            result: shortened.short_url,
        }),
    ))
}

/// Shortens several URLs at once.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [{ "correlation_id": "1", "original_url": "https://example.com" }]
/// ```
///
/// # Response
///
/// `201 Created` with `[{ "correlation_id": "1", "short_url": "..." }]` in input order.
///
/// # Errors
///
/// Returns 400 Bad Request for an empty batch or an empty URL.
/// Returns 409 Conflict if any URL was already shortened.
pub async fn batch_shorten_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<BatchShortenRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let original_urls: Vec<String> = payload
        .items
        .iter()
        .map(|item| item.original_url.clone())
        .collect();

    let short_urls = state
        .shortener
        .create_short_urls(&original_urls, user_id)
        .await?;

    let items: Vec<BatchResponseItem> = payload
        .items
        .into_iter()
        .zip(short_urls)
        .map(|(item, short_url)| BatchResponseItem {
            correlation_id: item.correlation_id,
            short_url,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(items)))
}

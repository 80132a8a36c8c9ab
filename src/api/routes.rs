//! API route configuration.
//!
//! All routes run behind [`crate::api::middleware::identity`], which attaches
//! the caller's user id.

use crate::api::handlers::{
    batch_shorten_handler, delete_user_urls_handler, shorten_handler, user_urls_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// JSON API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Shorten one URL
/// - `POST   /shorten/batch`  - Shorten several URLs
/// - `GET    /user/urls`      - List the caller's URLs
/// - `DELETE /user/urls`      - Schedule deletion of the caller's URLs
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/batch", post(batch_shorten_handler))
        .route(
            "/user/urls",
            get(user_urls_handler).delete(delete_user_urls_handler),
        )
}

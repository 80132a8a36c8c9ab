//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`            - Shorten a plain-text URL
//! - `GET  /{id}`        - Short URL redirect
//! - `/api/*`            - JSON API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Compression** - gzip responses and gzip request bodies
//! - **Identity** - Signed `token` cookie attached to every request

use crate::api;
use crate::api::handlers::{redirect_handler, shorten_text_handler};
use crate::api::middleware::{identity, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), identity::layer))
        .with_state(state)
        .layer(RequestDecompressionLayer::new())
        .layer(CompressionLayer::new())
        .layer(tracing::layer())
}

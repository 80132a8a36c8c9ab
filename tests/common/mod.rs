#![allow(dead_code)]

use axum_test::TestServer;
use shortener::application::services::{IdentityService, ShortenerService};
use shortener::domain::delete_worker::DeleteWorkerSettings;
use shortener::domain::repositories::ConversionRepository;
use shortener::infrastructure::persistence::MemoryRepository;
use shortener::routes::app_router;
use shortener::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "http://localhost:8080";
pub const COOKIE_SECRET: &str = "test-cookie-secret";

pub fn create_test_state(repository: Arc<dyn ConversionRepository>) -> AppState {
    let shortener = ShortenerService::new(repository, BASE_URL).with_delete_settings(
        DeleteWorkerSettings {
            concurrency: 4,
            check_timeout: Duration::from_millis(500),
        },
    );

    AppState::new(
        Arc::new(shortener),
        Arc::new(IdentityService::new(COOKIE_SECRET)),
    )
}

pub fn create_test_server() -> TestServer {
    create_test_server_with(Arc::new(MemoryRepository::in_memory()))
}

pub fn create_test_server_with(repository: Arc<dyn ConversionRepository>) -> TestServer {
    TestServer::new(app_router(create_test_state(repository))).unwrap()
}

/// Cookie value a client would hold for `user_id`.
pub fn identity_cookie(user_id: i64) -> String {
    IdentityService::new(COOKIE_SECRET).encode(user_id.into())
}

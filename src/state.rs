//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{IdentityService, ShortenerService};
use crate::domain::repositories::ConversionRepository;

/// Shortener service over whichever backend was selected at startup.
pub type DynShortenerService = ShortenerService<dyn ConversionRepository>;

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<DynShortenerService>,
    pub identity: Arc<IdentityService>,
}

impl AppState {
    pub fn new(shortener: Arc<DynShortenerService>, identity: Arc<IdentityService>) -> Self {
        Self {
            shortener,
            identity,
        }
    }
}

//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Short URL creation, resolution and deletion
//! - [`services::identity_service::IdentityService`] - Signed user identity cookie

pub mod services;

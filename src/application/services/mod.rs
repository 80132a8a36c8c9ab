//! Business logic services for the application layer.

pub mod identity_service;
pub mod shortener_service;

pub use identity_service::IdentityService;
pub use shortener_service::{Shortened, ShortenerService, UserUrl};

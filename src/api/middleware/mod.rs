//! HTTP middleware for request processing.
//!
//! Provides the user identity cookie and observability middleware.

pub mod identity;
pub mod tracing;

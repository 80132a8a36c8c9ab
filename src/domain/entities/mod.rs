//! Core domain entities.
//!
//! - [`Conversion`] - A stored short code to original URL mapping
//! - [`NewConversion`] - Input for inserting a mapping
//! - [`History`] - The per-user set of conversions
//! - [`UserId`] - Opaque session-derived grouping key

pub mod conversion;
pub mod history;
pub mod user;

pub use conversion::{Conversion, NewConversion};
pub use history::{History, HistoryEntry};
pub use user::UserId;

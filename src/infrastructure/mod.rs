//! Infrastructure layer implementing the storage contract from the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - In-memory, file-backed and PostgreSQL repositories

pub mod persistence;

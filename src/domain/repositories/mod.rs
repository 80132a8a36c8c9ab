//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for unit tests.

pub mod conversion_repository;

pub use conversion_repository::ConversionRepository;

#[cfg(test)]
pub use conversion_repository::MockConversionRepository;

//! Repository implementations.
//!
//! - [`MemoryRepository`] - In-memory tables, optionally mirrored to a [`SnapshotFile`]
//! - [`PgRepository`] - PostgreSQL storage via SQLx

pub mod memory_repository;
pub mod pg_repository;
pub mod snapshot_file;

pub use memory_repository::MemoryRepository;
pub use pg_repository::PgRepository;
pub use snapshot_file::{SnapshotData, SnapshotFile};

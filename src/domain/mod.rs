//! Domain layer containing business entities and logic.
//!
//! Defines entities, the repository interface and the background deletion
//! pipeline, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`delete_worker`] - Asynchronous soft-delete processing
//!
//! # Deletion Flow
//!
//! 1. HTTP handler accepts a delete request and answers `202 Accepted`
//! 2. [`crate::application::services::ShortenerService::schedule_deletion`] spawns the worker
//! 3. [`delete_worker::run_delete_worker`] checks ownership of every code concurrently
//! 4. Verified codes are marked via [`repositories::ConversionRepository::mark_delete_batch`]

pub mod delete_worker;
pub mod entities;
pub mod repositories;

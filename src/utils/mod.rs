//! Utility functions shared across layers.
//!
//! - [`codec`] - Short code derivation and short URL formatting

pub mod codec;

//! Shared webhook ingest domain primitives.
//!
//! This crate owns event normalization, storage key derivation, response
//! contracts, and configuration validation. It intentionally excludes AWS SDK
//! and Lambda runtime concerns.

pub mod config;
pub mod contract;
pub mod payload;
pub mod storage_keys;

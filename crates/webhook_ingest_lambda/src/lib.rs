//! AWS-oriented adapters and handlers for webhook ingestion.
//!
//! This crate owns runtime integration details (the Lambda handler and the
//! object store boundary) on top of the domain primitives in
//! `webhook_ingest_core`.

pub mod adapters;
pub mod handlers;

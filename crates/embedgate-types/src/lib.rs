//! Shared domain types for embedgate.
//!
//! This crate contains the data model used across the gateway: inference
//! requests and responses, the fixed-length [`embedding::Embedding`], backend
//! descriptors, gateway configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod backend;
pub mod config;
pub mod embedding;
pub mod error;
pub mod request;

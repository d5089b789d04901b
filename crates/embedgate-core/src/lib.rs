//! Business logic and backend trait definitions for embedgate.
//!
//! This crate defines the "ports" (the [`backend::InferenceBackend`] and
//! [`registry::BackendLoader`] traits) that the infrastructure layer
//! implements, plus the dispatch core: the adapter registry, the inference
//! dispatcher, and the deterministic fallback generator. It depends only on
//! `embedgate-types` -- never on `embedgate-infra` or any HTTP crate.

pub mod backend;
pub mod dispatcher;
pub mod fallback;
pub mod normalize;
pub mod registry;

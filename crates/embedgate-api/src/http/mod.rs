//! HTTP layer for embedgate.
//!
//! Axum-based service exposing `POST /infer` and `GET /health`.

pub mod error;
pub mod handlers;
pub mod router;

//! Span attribute values for inference requests.
//!
//! The per-request span is named `"gen_ai.embeddings"` and carries these
//! fields, following the OTel GenAI semantic conventions where one exists:
//!
//! - `gen_ai.operation.name` -- always [`OP_EMBEDDINGS`]
//! - `gen_ai.provider.name` -- backend protocol, or [`PROVIDER_NONE`]
//! - `gen_ai.request.model` -- configured model identifier
//! - `embedgate.outcome` -- `"backend"`, `"fallback"`, or [`OUTCOME_UNAVAILABLE`]

/// Embedding generation operation.
pub const OP_EMBEDDINGS: &str = "embeddings";

/// Provider value when no backend is configured.
pub const PROVIDER_NONE: &str = "none";

/// Outcome when the configured model is missing.
pub const OUTCOME_UNAVAILABLE: &str = "unavailable";

//! Inference dispatcher: the service-facing entry point.
//!
//! Resolves the adapter through the [`AdapterRegistry`], invokes it under a
//! request-level deadline, and falls back to the
//! [`DeterministicFallbackGenerator`] when the adapter is absent, fails, or
//! does not answer in time. The one case surfaced as an error is a
//! Local-Model backend whose model file is missing: that is
//! misconfiguration, not a transient failure.

use std::sync::Arc;
use std::time::Duration;

use embedgate_types::backend::BackendKind;
use embedgate_types::embedding::Embedding;
use embedgate_types::error::DispatchError;
use embedgate_types::request::InferenceRequest;

use super::fallback::DeterministicFallbackGenerator;
use super::normalize::normalize_input;
use super::registry::{AdapterRegistry, BackendLoader};

/// Why a request was served by the fallback generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No backend is configured or its construction failed.
    NoBackend,
    /// The backend was called and returned nothing usable.
    BackendFailed,
    /// The request deadline elapsed before the backend answered.
    DeadlineElapsed,
}

impl FallbackReason {
    /// Message reported to callers alongside a fallback embedding.
    pub fn message(&self) -> &'static str {
        match self {
            FallbackReason::NoBackend => "fallback embedding (no model)",
            FallbackReason::BackendFailed | FallbackReason::DeadlineElapsed => {
                "fallback embedding (backend call failed)"
            }
        }
    }
}

/// Where a dispatched embedding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingSource {
    Backend(BackendKind),
    Fallback(FallbackReason),
}

impl EmbeddingSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, EmbeddingSource::Fallback(_))
    }

    /// Short label for logs and span fields.
    pub fn label(&self) -> &'static str {
        match self {
            EmbeddingSource::Backend(_) => "backend",
            EmbeddingSource::Fallback(_) => "fallback",
        }
    }
}

/// A successful dispatch.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub embedding: Embedding,
    pub source: EmbeddingSource,
}

impl Dispatched {
    /// Message for the response body: `None` for real embeddings.
    pub fn message(&self) -> Option<&'static str> {
        match self.source {
            EmbeddingSource::Backend(_) => None,
            EmbeddingSource::Fallback(reason) => Some(reason.message()),
        }
    }
}

/// Routes requests to the configured backend with deterministic fallback.
///
/// Holds no per-request mutable state; share it behind an `Arc`.
pub struct InferenceDispatcher<L> {
    registry: Arc<AdapterRegistry<L>>,
    fallback: DeterministicFallbackGenerator,
    request_deadline: Duration,
    normalize_input: bool,
}

impl<L: BackendLoader> InferenceDispatcher<L> {
    pub fn new(registry: Arc<AdapterRegistry<L>>, request_deadline: Duration) -> Self {
        Self {
            registry,
            fallback: DeterministicFallbackGenerator::new(),
            request_deadline,
            normalize_input: false,
        }
    }

    /// Scale inputs to zero mean / unit variance before they reach the backend.
    ///
    /// The fallback seed always uses the raw input.
    pub fn with_input_normalization(mut self, enabled: bool) -> Self {
        self.normalize_input = enabled;
        self
    }

    pub fn registry(&self) -> &AdapterRegistry<L> {
        &self.registry
    }

    /// Produce an embedding for `request`.
    ///
    /// Returns `Err` only for non-finite input values and for a Local-Model
    /// backend whose model file is missing.
    pub async fn handle(&self, request: &InferenceRequest) -> Result<Dispatched, DispatchError> {
        let input = request.input();
        if let Some(index) = input.iter().position(|v| !v.is_finite()) {
            return Err(DispatchError::InvalidInput(format!(
                "input[{index}] is not a finite f32; values must lie within ±{:e}",
                f32::MAX
            )));
        }

        let Some(backend) = self.registry.get().await else {
            if let Some(err) = self.registry.init_failure() {
                if err.is_model_missing() {
                    return Err(DispatchError::ModelUnavailable(err.to_string()));
                }
            }
            return Ok(self.fall_back(input, FallbackReason::NoBackend));
        };

        let normalized;
        let backend_input = if self.normalize_input {
            normalized = normalize_input(input);
            normalized.as_slice()
        } else {
            input
        };

        let call = backend.infer(&request.modality, backend_input);
        match tokio::time::timeout(self.request_deadline, call).await {
            Ok(Some(embedding)) => {
                tracing::debug!(backend = %backend.kind(), "Served embedding from backend");
                Ok(Dispatched {
                    embedding,
                    source: EmbeddingSource::Backend(backend.kind()),
                })
            }
            Ok(None) => Ok(self.fall_back(input, FallbackReason::BackendFailed)),
            Err(_) => {
                tracing::warn!(
                    backend = %backend.kind(),
                    deadline_ms = self.request_deadline.as_millis() as u64,
                    "Backend call abandoned at request deadline"
                );
                Ok(self.fall_back(input, FallbackReason::DeadlineElapsed))
            }
        }
    }

    fn fall_back(&self, input: &[f32], reason: FallbackReason) -> Dispatched {
        tracing::warn!(?reason, "Returning deterministic fallback embedding");
        Dispatched {
            embedding: self.fallback.generate(input),
            source: EmbeddingSource::Fallback(reason),
        }
    }
}

//! InferenceBackend trait for turning an input vector into an embedding.
//!
//! Implementations (local model, ONNX-style, TorchServe-style, Triton-style)
//! live in embedgate-infra.

use std::future::Future;

use embedgate_types::backend::BackendKind;
use embedgate_types::embedding::Embedding;

/// A backend that can produce embeddings.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait InferenceBackend: Send + Sync {
    /// Which protocol this backend speaks.
    fn kind(&self) -> BackendKind;

    /// Embed `input` for the given modality.
    ///
    /// Every failure mode (transport, timeout, non-200 status, malformed
    /// response, wrong dimensionality) is logged by the implementation and
    /// reported as `None`. No error detail crosses this boundary.
    fn infer(
        &self,
        modality: &str,
        input: &[f32],
    ) -> impl Future<Output = Option<Embedding>> + Send;
}

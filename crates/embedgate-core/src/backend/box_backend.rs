//! BoxBackend -- object-safe dynamic dispatch wrapper for InferenceBackend.
//!
//! 1. Define an object-safe `InferenceBackendDyn` trait with boxed futures
//! 2. Blanket-impl `InferenceBackendDyn` for all `T: InferenceBackend`
//! 3. `BoxBackend` wraps `Box<dyn InferenceBackendDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use embedgate_types::backend::BackendKind;
use embedgate_types::embedding::Embedding;

use super::adapter::InferenceBackend;

/// Object-safe version of [`InferenceBackend`] with boxed futures.
pub trait InferenceBackendDyn: Send + Sync {
    fn kind_dyn(&self) -> BackendKind;

    fn infer_boxed<'a>(
        &'a self,
        modality: &'a str,
        input: &'a [f32],
    ) -> Pin<Box<dyn Future<Output = Option<Embedding>> + Send + 'a>>;
}

impl<T: InferenceBackend> InferenceBackendDyn for T {
    fn kind_dyn(&self) -> BackendKind {
        self.kind()
    }

    fn infer_boxed<'a>(
        &'a self,
        modality: &'a str,
        input: &'a [f32],
    ) -> Pin<Box<dyn Future<Output = Option<Embedding>> + Send + 'a>> {
        Box::pin(self.infer(modality, input))
    }
}

/// Type-erased backend, so the registry can hold whichever adapter the
/// loader built without being generic over it.
pub struct BoxBackend {
    inner: Box<dyn InferenceBackendDyn + Send + Sync>,
}

impl BoxBackend {
    pub fn new<T: InferenceBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.inner.kind_dyn()
    }

    pub async fn infer(&self, modality: &str, input: &[f32]) -> Option<Embedding> {
        self.inner.infer_boxed(modality, input).await
    }
}

impl std::fmt::Debug for BoxBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxBackend")
            .field("kind", &self.kind())
            .finish()
    }
}

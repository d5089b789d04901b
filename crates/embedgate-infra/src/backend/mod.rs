//! Concrete backend adapters and the loader that builds the configured one.
//!
//! The four protocols form a closed set: [`BackendAdapter`] is an enum with
//! one variant per protocol, dispatched through the single
//! [`InferenceBackend`] interface. Call failures are logged here and turned
//! into `None`; nothing protocol-specific reaches the dispatcher.

pub mod http;
pub mod local;
pub mod onnx;
pub mod torchserve;
pub mod triton;

use std::time::Duration;

use embedgate_core::backend::adapter::InferenceBackend;
use embedgate_core::backend::box_backend::BoxBackend;
use embedgate_core::registry::BackendLoader;
use embedgate_types::backend::{BackendDescriptor, BackendKind};
use embedgate_types::embedding::Embedding;
use embedgate_types::error::LoadError;

use self::local::LocalModelAdapter;
use self::onnx::OnnxAdapter;
use self::torchserve::TorchServeAdapter;
use self::triton::TritonAdapter;

/// One adapter per supported backend protocol.
pub enum BackendAdapter {
    Local(LocalModelAdapter),
    Onnx(OnnxAdapter),
    TorchServe(TorchServeAdapter),
    Triton(TritonAdapter),
}

impl BackendAdapter {
    /// Construct the adapter described by `descriptor`.
    ///
    /// HTTP adapters use `timeout` for every call.
    pub async fn connect(
        descriptor: &BackendDescriptor,
        timeout: Duration,
    ) -> Result<Self, LoadError> {
        let location = descriptor.location.as_str();
        let model = descriptor.model.as_str();
        Ok(match descriptor.kind {
            BackendKind::Local => Self::Local(LocalModelAdapter::load(location).await?),
            BackendKind::Onnx => Self::Onnx(OnnxAdapter::new(location, timeout)?),
            BackendKind::TorchServe => {
                Self::TorchServe(TorchServeAdapter::new(location, model, timeout)?)
            }
            BackendKind::Triton => Self::Triton(TritonAdapter::new(location, model, timeout)?),
        })
    }
}

impl InferenceBackend for BackendAdapter {
    fn kind(&self) -> BackendKind {
        match self {
            BackendAdapter::Local(_) => BackendKind::Local,
            BackendAdapter::Onnx(_) => BackendKind::Onnx,
            BackendAdapter::TorchServe(_) => BackendKind::TorchServe,
            BackendAdapter::Triton(_) => BackendKind::Triton,
        }
    }

    async fn infer(&self, modality: &str, input: &[f32]) -> Option<Embedding> {
        let result = match self {
            BackendAdapter::Local(model) => model.call(input),
            BackendAdapter::Onnx(adapter) => adapter.call(modality, input).await,
            BackendAdapter::TorchServe(adapter) => adapter.call(input).await,
            BackendAdapter::Triton(adapter) => adapter.call(input).await,
        };

        match result {
            Ok(embedding) => Some(embedding),
            Err(err) => {
                tracing::warn!(backend = %self.kind(), error = %err, "Backend call failed");
                None
            }
        }
    }
}

/// Builds the backend named in the gateway configuration.
pub struct ConfiguredBackendLoader {
    descriptor: Option<BackendDescriptor>,
    timeout: Duration,
}

impl ConfiguredBackendLoader {
    pub fn new(descriptor: Option<BackendDescriptor>, timeout: Duration) -> Self {
        Self {
            descriptor,
            timeout,
        }
    }
}

impl BackendLoader for ConfiguredBackendLoader {
    fn descriptor(&self) -> Option<&BackendDescriptor> {
        self.descriptor.as_ref()
    }

    async fn load(&self) -> Result<BoxBackend, LoadError> {
        let descriptor = self.descriptor.as_ref().ok_or(LoadError::NotConfigured)?;
        BackendAdapter::connect(descriptor, self.timeout)
            .await
            .map(BoxBackend::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;

    use embedgate_core::dispatcher::{EmbeddingSource, FallbackReason, InferenceDispatcher};
    use embedgate_core::fallback::DeterministicFallbackGenerator;
    use embedgate_core::registry::AdapterRegistry;
    use embedgate_types::embedding::EMBEDDING_DIM;
    use embedgate_types::request::InferenceRequest;
    use tempfile::TempDir;

    use crate::simulator::{SimulatorConfig, simulated_embedding, spawn_simulator};
    use crate::backend::http::DEFAULT_BACKEND_TIMEOUT;

    async fn simulator(config: SimulatorConfig) -> String {
        let (addr, _handle): (SocketAddr, _) = spawn_simulator(config).await.unwrap();
        format!("http://{addr}")
    }

    async fn adapter(kind: BackendKind, endpoint: &str) -> BackendAdapter {
        let descriptor = BackendDescriptor::new(kind, endpoint);
        BackendAdapter::connect(&descriptor, DEFAULT_BACKEND_TIMEOUT)
            .await
            .unwrap_or_else(|e| panic!("connect failed: {e}"))
    }

    #[tokio::test]
    async fn test_onnx_adapter_against_simulator() {
        let endpoint = simulator(SimulatorConfig::default()).await;
        let onnx = adapter(BackendKind::Onnx, &endpoint).await;
        let emb = onnx.infer("text", &[1.0, 2.0, 3.0]).await.unwrap();
        assert_eq!(emb.as_slice(), simulated_embedding("text", &[1.0, 2.0, 3.0]).as_slice());
    }

    #[tokio::test]
    async fn test_torchserve_adapter_against_simulator() {
        let endpoint = simulator(SimulatorConfig::default()).await;
        let torchserve = adapter(BackendKind::TorchServe, &endpoint).await;
        let emb = torchserve.infer("text", &[0.5, 0.25]).await.unwrap();
        assert_eq!(emb.len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_triton_adapter_against_simulator() {
        let endpoint = simulator(SimulatorConfig::default()).await;
        let triton = adapter(BackendKind::Triton, &endpoint).await;
        let emb = triton.infer("image", &[9.0]).await.unwrap();
        assert_eq!(emb.len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_http_500_is_absent() {
        let endpoint = simulator(SimulatorConfig::default().with_forced_status(500)).await;
        for kind in [BackendKind::Onnx, BackendKind::TorchServe, BackendKind::Triton] {
            let backend = adapter(kind, &endpoint).await;
            assert!(backend.infer("text", &[1.0]).await.is_none(), "{kind} should be absent");
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_absent() {
        // Bind then drop a listener to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = adapter(BackendKind::Onnx, &format!("http://{addr}")).await;
        assert!(backend.infer("text", &[1.0]).await.is_none());
    }

    #[tokio::test]
    async fn test_backend_timeout_is_absent() {
        let endpoint = simulator(
            SimulatorConfig::default().with_latency(std::time::Duration::from_millis(500)),
        )
        .await;
        let descriptor = BackendDescriptor::new(BackendKind::Onnx, endpoint);
        let backend = BackendAdapter::connect(&descriptor, std::time::Duration::from_millis(50))
            .await
            .unwrap();
        assert!(backend.infer("text", &[1.0]).await.is_none());
    }

    #[tokio::test]
    async fn test_loader_without_descriptor_is_not_configured() {
        let loader = ConfiguredBackendLoader::new(None, DEFAULT_BACKEND_TIMEOUT);
        let err = loader.load().await.err().unwrap();
        assert_eq!(err, LoadError::NotConfigured);
    }

    #[tokio::test]
    async fn test_loader_rejects_bad_endpoint() {
        let loader = ConfiguredBackendLoader::new(
            Some(BackendDescriptor::new(BackendKind::Triton, "localhost")),
            DEFAULT_BACKEND_TIMEOUT,
        );
        let err = loader.load().await.err().unwrap();
        assert!(matches!(err, LoadError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_dispatcher_falls_back_when_onnx_returns_500() {
        let endpoint = simulator(SimulatorConfig::default().with_forced_status(500)).await;
        let loader = ConfiguredBackendLoader::new(
            Some(BackendDescriptor::new(BackendKind::Onnx, endpoint)),
            DEFAULT_BACKEND_TIMEOUT,
        );
        let registry = Arc::new(AdapterRegistry::new(loader));
        let dispatcher = InferenceDispatcher::new(registry, std::time::Duration::from_secs(10));

        let out = dispatcher
            .handle(&InferenceRequest::new("text", vec![1.0, 2.0, 3.0]))
            .await
            .unwrap();
        assert_eq!(
            out.source,
            EmbeddingSource::Fallback(FallbackReason::BackendFailed)
        );
        assert_eq!(
            out.embedding,
            DeterministicFallbackGenerator::new().generate(&[1.0, 2.0, 3.0])
        );
    }

    /// A backend that answers HTTP 200 with embeddings of the wrong length.
    async fn wrong_length_backend() -> String {
        use axum::Json;
        use axum::routing::post;
        use serde_json::json;

        let router = axum::Router::new()
            .route(
                "/v1/infer",
                post(|| async { Json(json!({ "embedding": vec![0.5_f32; 64] })) }),
            )
            .route(
                "/models/{model}/predict",
                post(|| async { Json(json!({ "data": [vec![0.5_f32; 64]] })) }),
            )
            .route(
                "/v1/models/{model}/infer",
                post(|| async {
                    Json(json!({
                        "model_name": "nmar_model",
                        "outputs": [{
                            "name": "OUTPUT__0",
                            "datatype": "FP32",
                            "shape": [1, 200],
                            "data": [vec![0.5_f32; 200]],
                        }],
                    }))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_dispatcher_falls_back_on_wrong_length_embedding() {
        let endpoint = wrong_length_backend().await;
        let input = vec![1.0, 2.0, 3.0];
        let expected = DeterministicFallbackGenerator::new().generate(&input);

        for kind in [BackendKind::Onnx, BackendKind::TorchServe, BackendKind::Triton] {
            let loader = ConfiguredBackendLoader::new(
                Some(BackendDescriptor::new(kind, endpoint.clone())),
                DEFAULT_BACKEND_TIMEOUT,
            );
            let registry = Arc::new(AdapterRegistry::new(loader));
            let dispatcher =
                InferenceDispatcher::new(registry, std::time::Duration::from_secs(10));

            let out = dispatcher
                .handle(&InferenceRequest::new("text", input.clone()))
                .await
                .unwrap();
            assert_eq!(
                out.source,
                EmbeddingSource::Fallback(FallbackReason::BackendFailed),
                "{kind} should fall back"
            );
            assert_eq!(out.embedding.len(), EMBEDDING_DIM);
            assert_eq!(out.embedding, expected);
        }
    }

    #[tokio::test]
    async fn test_dispatcher_reports_missing_local_model() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("model.json");
        let loader = ConfiguredBackendLoader::new(
            Some(BackendDescriptor::new(
                BackendKind::Local,
                missing.to_string_lossy(),
            )),
            DEFAULT_BACKEND_TIMEOUT,
        );
        let registry = Arc::new(AdapterRegistry::new(loader));
        let dispatcher = InferenceDispatcher::new(registry, std::time::Duration::from_secs(10));

        let err = dispatcher
            .handle(&InferenceRequest::new("text", vec![1.0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            embedgate_types::error::DispatchError::ModelUnavailable(_)
        ));
    }
}

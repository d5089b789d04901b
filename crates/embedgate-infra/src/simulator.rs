//! Simulated remote inference service.
//!
//! An axum router that speaks all three HTTP backend protocols plus the
//! legacy key-checked `/v1/get_embedding` route, returning deterministic
//! pseudo-embeddings. It stands in for a real ONNX / TorchServe / Triton
//! deployment in local runs and tests.
//!
//! Embeddings are seeded from `trunc(sum(input) * 1000)` XOR a stable hash of
//! the modality (the model name for protocols that carry no modality), and
//! drawn from a Gaussian with mean 0 and standard deviation 0.5.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use embedgate_types::embedding::EMBEDDING_DIM;

use crate::backend::onnx::{INFER_PATH, OnnxResponse};
use crate::backend::torchserve::TorchServeBatch;
use crate::backend::triton::{FP32, OUTPUT_TENSOR, TritonData, TritonInferRequest};

/// API key accepted by `/v1/get_embedding` when none is configured.
pub const DEFAULT_API_KEY: &str = "local_dummy_key";

/// Standard deviation of simulated embedding values.
const SIMULATED_STD: f32 = 0.5;

/// Behavior of the simulated service.
pub struct SimulatorConfig {
    pub api_key: SecretString,
    /// When set, every protocol route answers with this status and no embedding.
    pub forced_status: Option<u16>,
    /// Artificial delay before each response.
    pub latency: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(DEFAULT_API_KEY),
            forced_status: None,
            latency: Duration::ZERO,
        }
    }
}

impl SimulatorConfig {
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_forced_status(mut self, status: u16) -> Self {
        self.forced_status = Some(status);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// FNV-1a over the modality bytes; stable across processes and platforms.
fn modality_hash(modality: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    modality
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// The embedding the simulator returns for `(modality, input)`.
pub fn simulated_embedding(modality: &str, input: &[f32]) -> Vec<f32> {
    let sum: f64 = input.iter().map(|&v| f64::from(v)).sum();
    let seed = ((sum * 1000.0).trunc() as i64 as u64) ^ modality_hash(modality);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..EMBEDDING_DIM)
        .map(|_| rng.sample::<f32, _>(StandardNormal) * SIMULATED_STD)
        .collect()
}

struct SimulatorState {
    config: SimulatorConfig,
}

type SharedState = Arc<SimulatorState>;

impl SimulatorState {
    /// Apply latency, then return the forced failure response if configured.
    async fn preamble(&self) -> Option<Response> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        let status = self.config.forced_status?;
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Some((status, Json(json!({"error": "simulated failure"}))).into_response())
    }
}

/// Build the simulator router.
pub fn simulator_router(config: SimulatorConfig) -> Router {
    let state: SharedState = Arc::new(SimulatorState { config });
    Router::new()
        .route(INFER_PATH, post(onnx_infer))
        .route("/models/{model}/predict", post(torchserve_predict))
        .route("/v1/models/{model}/infer", post(triton_infer))
        .route("/v1/get_embedding", post(get_embedding))
        .with_state(state)
}

/// Serve the simulator on an already-bound listener until the future is dropped.
pub async fn serve_simulator(listener: TcpListener, config: SimulatorConfig) -> std::io::Result<()> {
    axum::serve(listener, simulator_router(config)).await
}

/// Bind the simulator to an ephemeral localhost port and run it in the background.
pub async fn spawn_simulator(
    config: SimulatorConfig,
) -> std::io::Result<(SocketAddr, JoinHandle<std::io::Result<()>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(serve_simulator(listener, config));
    Ok((addr, handle))
}

#[derive(Debug, Deserialize)]
struct OnnxInferBody {
    #[serde(default = "default_modality")]
    modality: String,
    #[serde(default)]
    input: Vec<f32>,
}

fn default_modality() -> String {
    "text".to_string()
}

/// POST /v1/infer (ONNX-style).
async fn onnx_infer(State(state): State<SharedState>, Json(body): Json<OnnxInferBody>) -> Response {
    if let Some(resp) = state.preamble().await {
        return resp;
    }
    let response = OnnxResponse {
        embedding: Some(simulated_embedding(&body.modality, &body.input)),
        message: Some("simulated embed".to_string()),
    };
    Json(response).into_response()
}

/// POST /models/{model}/predict (TorchServe-style).
async fn torchserve_predict(
    State(state): State<SharedState>,
    Path(model): Path<String>,
    Json(body): Json<TorchServeBatch>,
) -> Response {
    if let Some(resp) = state.preamble().await {
        return resp;
    }
    let data = body
        .data
        .iter()
        .map(|row| simulated_embedding(&model, row))
        .collect();
    Json(TorchServeBatch { data }).into_response()
}

/// POST /v1/models/{model}/infer (Triton-style).
async fn triton_infer(
    State(state): State<SharedState>,
    Path(model): Path<String>,
    Json(body): Json<TritonInferRequest>,
) -> Response {
    if let Some(resp) = state.preamble().await {
        return resp;
    }
    let Some(row) = body
        .inputs
        .into_iter()
        .next()
        .and_then(|tensor| tensor.data.into_first_row())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "request has no input tensor"})),
        )
            .into_response();
    };

    let embedding = simulated_embedding(&model, &row);
    Json(json!({
        "model_name": model,
        "outputs": [{
            "name": OUTPUT_TENSOR,
            "shape": [1, EMBEDDING_DIM],
            "datatype": FP32,
            "data": TritonData::Rows(vec![embedding]),
        }]
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct LegacyEmbeddingBody {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_modality")]
    modality: String,
    #[serde(default = "default_legacy_input")]
    input: Vec<f32>,
}

fn default_legacy_input() -> Vec<f32> {
    vec![0.0]
}

/// POST /v1/get_embedding (legacy, API-key checked).
async fn get_embedding(
    State(state): State<SharedState>,
    Json(body): Json<LegacyEmbeddingBody>,
) -> Response {
    let authorized = body
        .api_key
        .as_deref()
        .is_some_and(|key| key == state.config.api_key.expose_secret());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))).into_response();
    }
    if let Some(resp) = state.preamble().await {
        return resp;
    }
    Json(json!({
        "embedding": simulated_embedding(&body.modality, &body.input),
        "message": "simulated embed",
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn post_json(url: String, body: serde_json::Value) -> (u16, serde_json::Value) {
        let resp = reqwest::Client::new().post(url).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        let json = resp.json().await.unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[test]
    fn test_simulated_embedding_is_deterministic() {
        let a = simulated_embedding("text", &[1.0, 2.0, 3.0]);
        let b = simulated_embedding("text", &[1.0, 2.0, 3.0]);
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIM);
    }

    #[test]
    fn test_modality_changes_embedding() {
        assert_ne!(
            simulated_embedding("text", &[1.0]),
            simulated_embedding("image", &[1.0])
        );
    }

    #[tokio::test]
    async fn test_legacy_route_requires_api_key() {
        let (addr, _handle) = spawn_simulator(SimulatorConfig::default()).await.unwrap();
        let url = format!("http://{addr}/v1/get_embedding");

        let (status, body) = post_json(url.clone(), json!({"modality": "text", "input": [1.0]})).await;
        assert_eq!(status, 401);
        assert_eq!(body["error"], "unauthorized");

        let (status, body) = post_json(
            url,
            json!({"api_key": DEFAULT_API_KEY, "modality": "text", "input": [1.0]}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["embedding"].as_array().unwrap().len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_custom_api_key() {
        let config = SimulatorConfig::default().with_api_key(SecretString::from("s3cret"));
        let (addr, _handle) = spawn_simulator(config).await.unwrap();
        let url = format!("http://{addr}/v1/get_embedding");

        let (status, _) = post_json(url.clone(), json!({"api_key": DEFAULT_API_KEY})).await;
        assert_eq!(status, 401);
        let (status, _) = post_json(url, json!({"api_key": "s3cret"})).await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_forced_status_applies_to_protocol_routes() {
        let (addr, _handle) = spawn_simulator(SimulatorConfig::default().with_forced_status(503))
            .await
            .unwrap();
        let (status, _) = post_json(
            format!("http://{addr}/v1/infer"),
            json!({"modality": "text", "input": [1.0]}),
        )
        .await;
        assert_eq!(status, 503);
    }

    #[tokio::test]
    async fn test_triton_response_shape() {
        let (addr, _handle) = spawn_simulator(SimulatorConfig::default()).await.unwrap();
        let (status, body) = post_json(
            format!("http://{addr}/v1/models/nmar_model/infer"),
            serde_json::to_value(TritonInferRequest::single_row(&[1.0, 2.0])).unwrap(),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["model_name"], "nmar_model");
        assert_eq!(
            body["outputs"][0]["data"][0].as_array().unwrap().len(),
            EMBEDDING_DIM
        );
    }
}

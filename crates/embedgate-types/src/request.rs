//! Wire types for the `POST /infer` service boundary.

use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;

/// An embedding request: a free-form modality tag plus a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Modality tag (e.g. "text", "image").
    pub modality: String,
    /// Request payload. A missing payload behaves like an empty input.
    #[serde(default)]
    pub payload: Option<InferencePayload>,
}

/// Payload mapping. `input` holds the preprocessed vector; any other keys are
/// carried along untouched.
///
/// Values are `f32`. A JSON number outside the `f32` range (magnitude above
/// about 3.4e38) decodes to infinity and the request is rejected with 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferencePayload {
    #[serde(default)]
    pub input: Vec<f32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InferenceRequest {
    pub fn new(modality: impl Into<String>, input: Vec<f32>) -> Self {
        Self {
            modality: modality.into(),
            payload: Some(InferencePayload {
                input,
                extra: serde_json::Map::new(),
            }),
        }
    }

    /// The input vector, empty when the payload or its `input` key is absent.
    pub fn input(&self) -> &[f32] {
        self.payload
            .as_ref()
            .map(|p| p.input.as_slice())
            .unwrap_or(&[])
    }
}

/// Response body of `POST /infer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub success: bool,
    pub embedding: Option<Embedding>,
    pub message: Option<String>,
}

impl InferenceResponse {
    pub fn ok(embedding: Embedding, message: Option<String>) -> Self {
        Self {
            success: true,
            embedding: Some(embedding),
            message,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            embedding: None,
            message: Some(message.into()),
        }
    }
}

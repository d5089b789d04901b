//! ONNX-style HTTP backend.
//!
//! `POST {endpoint}/v1/infer` with `{"modality", "input"}`; the embedding is
//! the `embedding` field of the HTTP 200 response.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use embedgate_types::embedding::Embedding;
use embedgate_types::error::{BackendError, LoadError};

use super::http::HttpTransport;

pub(crate) const INFER_PATH: &str = "/v1/infer";

#[derive(Debug, Serialize)]
pub(crate) struct OnnxRequest<'a> {
    pub modality: &'a str,
    pub input: &'a [f32],
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OnnxResponse {
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Adapter for an ONNX-style inference service.
pub struct OnnxAdapter {
    transport: HttpTransport,
}

impl OnnxAdapter {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LoadError> {
        Ok(Self {
            transport: HttpTransport::new(endpoint, timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.transport.base_url()
    }

    pub(crate) async fn call(&self, modality: &str, input: &[f32]) -> Result<Embedding, BackendError> {
        let body = OnnxRequest { modality, input };
        let response: OnnxResponse = self.transport.post_json(INFER_PATH, &body).await?;
        let values = response.embedding.ok_or_else(|| {
            BackendError::MalformedResponse("response has no 'embedding' field".to_string())
        })?;
        Ok(Embedding::try_from(values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope() {
        let body = OnnxRequest {
            modality: "text",
            input: &[1.0, 2.0],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"modality": "text", "input": [1.0, 2.0]}));
    }

    #[test]
    fn test_response_without_embedding_parses() {
        let resp: OnnxResponse = serde_json::from_str(r#"{"message":"busy"}"#).unwrap();
        assert!(resp.embedding.is_none());
    }
}

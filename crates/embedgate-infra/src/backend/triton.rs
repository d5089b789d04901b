//! Triton-style HTTP backend.
//!
//! `POST {endpoint}/v1/models/{model}/infer` with a named-tensor envelope.
//! The embedding is `outputs[0].data[0]`; a flat `outputs[0].data` row is
//! accepted as well.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use embedgate_types::embedding::Embedding;
use embedgate_types::error::{BackendError, LoadError};

use super::http::HttpTransport;

pub(crate) const INPUT_TENSOR: &str = "INPUT__0";
pub(crate) const OUTPUT_TENSOR: &str = "OUTPUT__0";
pub(crate) const FP32: &str = "FP32";

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TritonTensor {
    pub name: String,
    pub shape: Vec<usize>,
    pub datatype: String,
    pub data: TritonData,
}

/// Tensor payload: batched rows or a single flat row.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum TritonData {
    Rows(Vec<Vec<f32>>),
    Flat(Vec<f32>),
}

impl TritonData {
    /// The first row of the tensor.
    pub fn into_first_row(self) -> Option<Vec<f32>> {
        match self {
            TritonData::Rows(rows) => rows.into_iter().next(),
            TritonData::Flat(row) => Some(row),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TritonInferRequest {
    pub inputs: Vec<TritonTensor>,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

impl TritonInferRequest {
    pub fn single_row(input: &[f32]) -> Self {
        Self {
            inputs: vec![TritonTensor {
                name: INPUT_TENSOR.to_string(),
                shape: vec![1, input.len()],
                datatype: FP32.to_string(),
                data: TritonData::Rows(vec![input.to_vec()]),
            }],
            parameters: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TritonOutput {
    data: TritonData,
}

#[derive(Debug, Deserialize)]
struct TritonInferResponse {
    #[serde(default)]
    outputs: Vec<TritonOutput>,
}

/// Adapter for a Triton-style inference service.
pub struct TritonAdapter {
    transport: HttpTransport,
    infer_path: String,
}

impl TritonAdapter {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, LoadError> {
        Ok(Self {
            transport: HttpTransport::new(endpoint, timeout)?,
            infer_path: format!("/v1/models/{model}/infer"),
        })
    }

    pub fn infer_url(&self) -> String {
        self.transport.url(&self.infer_path)
    }

    pub(crate) async fn call(&self, input: &[f32]) -> Result<Embedding, BackendError> {
        let body = TritonInferRequest::single_row(input);
        let response: TritonInferResponse = self.transport.post_json(&self.infer_path, &body).await?;
        let row = response
            .outputs
            .into_iter()
            .next()
            .and_then(|output| output.data.into_first_row())
            .ok_or_else(|| {
                BackendError::MalformedResponse("response has no output tensor data".to_string())
            })?;
        Ok(Embedding::try_from(row)?)
    }
}

//! TorchServe-style HTTP backend.
//!
//! `POST {endpoint}/models/{model}/predict` with `{"data": [[...]]}`; the
//! embedding is the first row of the response's `data`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use embedgate_types::embedding::Embedding;
use embedgate_types::error::{BackendError, LoadError};

use super::http::HttpTransport;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TorchServeBatch {
    pub data: Vec<Vec<f32>>,
}

/// Adapter for a TorchServe-style inference service.
pub struct TorchServeAdapter {
    transport: HttpTransport,
    predict_path: String,
}

impl TorchServeAdapter {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, LoadError> {
        Ok(Self {
            transport: HttpTransport::new(endpoint, timeout)?,
            predict_path: format!("/models/{model}/predict"),
        })
    }

    pub fn predict_url(&self) -> String {
        self.transport.url(&self.predict_path)
    }

    pub(crate) async fn call(&self, input: &[f32]) -> Result<Embedding, BackendError> {
        let body = TorchServeBatch {
            data: vec![input.to_vec()],
        };
        let response: TorchServeBatch = self.transport.post_json(&self.predict_path, &body).await?;
        let first = response.data.into_iter().next().ok_or_else(|| {
            BackendError::MalformedResponse("response 'data' is empty".to_string())
        })?;
        Ok(Embedding::try_from(first)?)
    }
}

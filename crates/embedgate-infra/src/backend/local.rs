//! In-process Local-Model backend.
//!
//! The model is a single dense projection layer stored as JSON:
//!
//! ```json
//! { "input_dim": 3, "weights": [[...], ...], "bias": [...], "activation": "tanh" }
//! ```
//!
//! `weights` has one row of `input_dim` values per output dimension (128
//! rows). Inference computes `activation(W·x + b)` with no network I/O.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use embedgate_types::embedding::{EMBEDDING_DIM, Embedding};
use embedgate_types::error::{BackendError, LoadError};

/// File extensions of model formats that need a runtime this build lacks.
const UNSUPPORTED_FORMATS: &[&str] = &["onnx", "pt", "pth", "torchscript"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Identity,
    Tanh,
    Relu,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Identity => x,
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DenseModelFile {
    input_dim: usize,
    weights: Vec<Vec<f32>>,
    #[serde(default)]
    bias: Option<Vec<f32>>,
    #[serde(default)]
    activation: Activation,
}

/// A loaded dense projection model.
pub struct LocalModelAdapter {
    path: PathBuf,
    input_dim: usize,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    activation: Activation,
}

impl LocalModelAdapter {
    /// Load and validate the model at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading local model");

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(LoadError::ModelFileMissing(path.to_path_buf()));
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = ext.to_lowercase();
            if UNSUPPORTED_FORMATS.contains(&ext.as_str()) {
                return Err(LoadError::RuntimeUnavailable(format!(
                    "no in-process runtime for '.{ext}' models"
                )));
            }
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::InvalidModel(format!("failed to read {}: {e}", path.display())))?;
        let file: DenseModelFile = serde_json::from_str(&content)
            .map_err(|e| LoadError::InvalidModel(format!("failed to parse {}: {e}", path.display())))?;

        Self::from_parts(path.to_path_buf(), file)
    }

    fn from_parts(path: PathBuf, file: DenseModelFile) -> Result<Self, LoadError> {
        if file.input_dim == 0 {
            return Err(LoadError::InvalidModel("input_dim must be positive".to_string()));
        }
        if file.weights.len() != EMBEDDING_DIM {
            return Err(LoadError::InvalidModel(format!(
                "expected {EMBEDDING_DIM} weight rows, got {}",
                file.weights.len()
            )));
        }
        if let Some(row) = file.weights.iter().position(|r| r.len() != file.input_dim) {
            return Err(LoadError::InvalidModel(format!(
                "weight row {row} has {} values, expected {}",
                file.weights[row].len(),
                file.input_dim
            )));
        }
        let bias = file.bias.unwrap_or_else(|| vec![0.0; EMBEDDING_DIM]);
        if bias.len() != EMBEDDING_DIM {
            return Err(LoadError::InvalidModel(format!(
                "expected {EMBEDDING_DIM} bias values, got {}",
                bias.len()
            )));
        }

        Ok(Self {
            path,
            input_dim: file.input_dim,
            weights: file.weights,
            bias,
            activation: file.activation,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Run the projection on `input`.
    pub(crate) fn call(&self, input: &[f32]) -> Result<Embedding, BackendError> {
        if input.len() != self.input_dim {
            return Err(BackendError::Inference(format!(
                "model expects {} input values, got {}",
                self.input_dim,
                input.len()
            )));
        }

        let output: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let dot: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.activation.apply(dot + b)
            })
            .collect();

        Ok(Embedding::try_from(output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn model_json(input_dim: usize, activation: &str) -> String {
        let weights: Vec<Vec<f32>> = (0..EMBEDDING_DIM)
            .map(|i| vec![if i % 2 == 0 { 1.0 } else { -1.0 }; input_dim])
            .collect();
        serde_json::json!({
            "input_dim": input_dim,
            "weights": weights,
            "bias": vec![0.5f32; EMBEDDING_DIM],
            "activation": activation,
        })
        .to_string()
    }

    async fn write_model(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = LocalModelAdapter::load(tmp.path().join("absent.json"))
            .await
            .err()
            .unwrap();
        assert!(err.is_model_missing());
    }

    #[tokio::test]
    async fn test_unsupported_format_is_runtime_unavailable() {
        let tmp = TempDir::new().unwrap();
        let path = write_model(&tmp, "model.onnx", "binary").await;
        let err = LocalModelAdapter::load(&path).await.err().unwrap();
        assert!(matches!(err, LoadError::RuntimeUnavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_file_is_invalid_model() {
        let tmp = TempDir::new().unwrap();
        let path = write_model(&tmp, "model.json", "{ not json").await;
        let err = LocalModelAdapter::load(&path).await.err().unwrap();
        assert!(matches!(err, LoadError::InvalidModel(_)));
    }

    #[tokio::test]
    async fn test_wrong_row_count_is_invalid_model() {
        let tmp = TempDir::new().unwrap();
        let content = serde_json::json!({"input_dim": 2, "weights": [[1.0, 1.0]]}).to_string();
        let path = write_model(&tmp, "model.json", &content).await;
        let err = LocalModelAdapter::load(&path).await.err().unwrap();
        assert!(err.to_string().contains("expected 128 weight rows"));
    }

    #[tokio::test]
    async fn test_projection_output() {
        let tmp = TempDir::new().unwrap();
        let path = write_model(&tmp, "model.json", &model_json(3, "identity")).await;
        let model = LocalModelAdapter::load(&path).await.unwrap();
        assert_eq!(model.input_dim(), 3);

        let emb = model.call(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(emb.len(), EMBEDDING_DIM);
        assert_eq!(emb.as_slice()[0], 6.5);
        assert_eq!(emb.as_slice()[1], -5.5);
    }

    #[tokio::test]
    async fn test_relu_activation() {
        let tmp = TempDir::new().unwrap();
        let path = write_model(&tmp, "model.json", &model_json(2, "relu")).await;
        let model = LocalModelAdapter::load(&path).await.unwrap();
        let emb = model.call(&[1.0, 1.0]).unwrap();
        assert_eq!(emb.as_slice()[0], 2.5);
        assert_eq!(emb.as_slice()[1], 0.0);
    }

    #[tokio::test]
    async fn test_input_dimension_mismatch_fails() {
        let tmp = TempDir::new().unwrap();
        let path = write_model(&tmp, "model.json", &model_json(3, "tanh")).await;
        let model = LocalModelAdapter::load(&path).await.unwrap();
        let err = model.call(&[1.0]).unwrap_err();
        assert!(matches!(err, BackendError::Inference(_)));
    }
}

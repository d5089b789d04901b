use std::path::PathBuf;

use thiserror::Error;

/// Errors in gateway configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend kind: '{0}'")]
    InvalidBackendKind(String),

    #[error("backend '{0}' requires an endpoint URL")]
    MissingEndpoint(String),

    #[error("local backend requires a model path")]
    MissingModelPath,

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to read config: {0}")]
    Io(String),
}

/// Errors raised while constructing a backend adapter.
///
/// These never escape the adapter registry as errors; the registry records
/// them and reports the adapter as absent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("model file not found: {}", .0.display())]
    ModelFileMissing(PathBuf),

    #[error("model runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("no backend configured")]
    NotConfigured,
}

impl LoadError {
    /// Whether this failure means the configured model is missing outright,
    /// which the service boundary reports as unavailable instead of falling back.
    pub fn is_model_missing(&self) -> bool {
        matches!(self, LoadError::ModelFileMissing(_))
    }
}

/// Failures of a single backend call.
///
/// Logged inside the adapter and converted to an absent result.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend call timed out")]
    Timeout,

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("backend produced an invalid embedding: {0}")]
    InvalidEmbedding(#[from] EmbeddingError),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Shape violations of an embedding vector.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmbeddingError {
    #[error("expected {expected} values, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },
}

/// The only errors the inference dispatcher surfaces to the service boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

//! Backend descriptors: which inference backend the gateway talks to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Model identifier used when none is configured.
pub const DEFAULT_MODEL: &str = "nmar_model";

/// The closed set of supported backend protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process model loaded from a local file.
    #[serde(alias = "torch")]
    Local,
    /// ONNX-style HTTP inference service.
    Onnx,
    /// TorchServe-style HTTP inference service.
    #[serde(rename = "torchserve")]
    TorchServe,
    /// Triton-style HTTP inference service.
    Triton,
}

impl BackendKind {
    /// Whether this backend is reached over HTTP.
    pub fn is_remote(&self) -> bool {
        !matches!(self, BackendKind::Local)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Onnx => write!(f, "onnx"),
            BackendKind::TorchServe => write!(f, "torchserve"),
            BackendKind::Triton => write!(f, "triton"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "torch" => Ok(BackendKind::Local),
            "onnx" => Ok(BackendKind::Onnx),
            "torchserve" => Ok(BackendKind::TorchServe),
            "triton" => Ok(BackendKind::Triton),
            other => Err(ConfigError::InvalidBackendKind(other.to_string())),
        }
    }
}

/// Immutable description of the configured backend.
///
/// For [`BackendKind::Local`] `location` is a filesystem path; for the HTTP
/// kinds it is the base endpoint URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub location: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl BackendDescriptor {
    pub fn new(kind: BackendKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            model: default_model(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("local".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("ONNX".parse::<BackendKind>().unwrap(), BackendKind::Onnx);
        assert_eq!(
            "torchserve".parse::<BackendKind>().unwrap(),
            BackendKind::TorchServe
        );
        assert_eq!(" triton ".parse::<BackendKind>().unwrap(), BackendKind::Triton);
    }

    #[test]
    fn test_backend_kind_rejects_unknown() {
        let err = "tensorflow".parse::<BackendKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid backend kind: 'tensorflow'");
    }

    #[test]
    fn test_backend_kind_display_matches_serde() {
        for kind in [
            BackendKind::Local,
            BackendKind::Onnx,
            BackendKind::TorchServe,
            BackendKind::Triton,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_descriptor_default_model() {
        let desc: BackendDescriptor =
            serde_json::from_str(r#"{"kind":"triton","location":"http://localhost:8001"}"#)
                .unwrap();
        assert_eq!(desc.model, DEFAULT_MODEL);
        assert!(desc.kind.is_remote());
    }

    #[test]
    fn test_torch_alias_parses_from_env_and_config() {
        assert_eq!("torch".parse::<BackendKind>().unwrap(), BackendKind::Local);

        let desc: BackendDescriptor =
            toml::from_str("kind = \"torch\"\nlocation = \"/models/model.json\"\n").unwrap();
        assert_eq!(desc.kind, BackendKind::Local);
        assert_eq!(desc.kind.to_string(), "local");
    }
}

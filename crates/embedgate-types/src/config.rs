//! Gateway configuration types.
//!
//! `GatewayConfig` is read once at startup (TOML file plus CLI/environment
//! overrides) and never changes afterwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendDescriptor;

/// Top-level configuration for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// The configured backend. `None` means every request is served by the
    /// deterministic fallback.
    #[serde(default)]
    pub backend: Option<BackendDescriptor>,

    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Model-server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout for each HTTP backend call, in milliseconds.
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,

    /// Request-level deadline after which the backend call is abandoned.
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,

    /// Apply mean/variance scaling to the input before it reaches the backend.
    #[serde(default)]
    pub normalize_input: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_backend_timeout_ms() -> u64 {
    5_000
}

fn default_request_deadline_ms() -> u64 {
    10_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend: None,
            host: default_host(),
            port: default_port(),
            backend_timeout_ms: default_backend_timeout_ms(),
            request_deadline_ms: default_request_deadline_ms(),
            normalize_input: false,
        }
    }
}

impl GatewayConfig {
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_deadline_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

//! CLI command definitions for the `embedgate` binary.
//!
//! Uses clap derive macros for argument parsing. Every gateway setting can
//! come from a TOML file, an environment variable, or a flag; flags and
//! environment variables override the file.

pub mod infer;
pub mod simulate;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use embedgate_infra::config::{load_gateway_config, validate_config};
use embedgate_types::backend::{BackendDescriptor, BackendKind};
use embedgate_types::config::GatewayConfig;
use embedgate_types::error::ConfigError;

/// Embedding inference gateway with deterministic fallback.
#[derive(Parser)]
#[command(name = "embedgate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "EMBEDGATE_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP inference service.
    Serve(GatewayArgs),

    /// Run a single inference and print the response.
    Infer {
        #[command(flatten)]
        gateway: GatewayArgs,

        /// Modality tag sent with the request.
        #[arg(long, default_value = "text")]
        modality: String,

        /// Comma-separated input vector (e.g. `1.0,2.0,3.0`).
        #[arg(value_delimiter = ',', allow_negative_numbers = true)]
        input: Vec<f32>,

        /// Output machine-readable JSON instead of styled text.
        #[arg(long)]
        json: bool,
    },

    /// Run the simulated remote inference service.
    Simulate(simulate::SimulateArgs),

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Gateway configuration sources.
#[derive(Args, Debug, Default)]
pub struct GatewayArgs {
    /// TOML configuration file.
    #[arg(long, env = "EMBEDGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend kind: none, local, onnx, torchserve, triton.
    #[arg(long, env = "EMBEDGATE_BACKEND")]
    pub backend: Option<String>,

    /// Base URL of an HTTP backend.
    #[arg(long, env = "EMBEDGATE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Path of the local model file.
    #[arg(long, env = "EMBEDGATE_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Model identifier on the backend.
    #[arg(long, env = "EMBEDGATE_MODEL")]
    pub model: Option<String>,

    /// Address to bind to.
    #[arg(long, env = "EMBEDGATE_HOST")]
    pub host: Option<String>,

    /// Model-server port.
    #[arg(short, long, env = "EMBEDGATE_PORT")]
    pub port: Option<u16>,

    /// Scale inputs to zero mean and unit variance before the backend sees them.
    #[arg(long)]
    pub normalize: bool,
}

impl GatewayArgs {
    /// Load the config file (if any) and apply flag/environment overrides.
    pub async fn resolve(&self) -> Result<GatewayConfig, ConfigError> {
        let base = load_gateway_config(self.config.as_deref()).await?;
        self.apply(base)
    }

    fn apply(&self, mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
        if let Some(kind) = &self.backend {
            config.backend = if kind.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                let kind: BackendKind = kind.parse()?;
                let location = match kind {
                    BackendKind::Local => self
                        .model_path
                        .as_ref()
                        .map(|p| p.to_string_lossy().into_owned())
                        .ok_or(ConfigError::MissingModelPath)?,
                    _ => self
                        .endpoint
                        .clone()
                        .ok_or_else(|| ConfigError::MissingEndpoint(kind.to_string()))?,
                };
                Some(BackendDescriptor::new(kind, location))
            };
        } else if let Some(backend) = config.backend.as_mut() {
            let location = match backend.kind {
                BackendKind::Local => self
                    .model_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                _ => self.endpoint.clone(),
            };
            if let Some(location) = location {
                backend.location = location;
            }
        }

        if let (Some(backend), Some(model)) = (config.backend.as_mut(), &self.model) {
            backend.model = model.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.normalize {
            config.normalize_input = true;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

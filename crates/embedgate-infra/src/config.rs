//! Gateway configuration loader.
//!
//! Reads an optional TOML file into [`GatewayConfig`] and validates the
//! backend descriptor. Unlike soft settings, a wrong backend is
//! misconfiguration: parse and validation failures are returned as
//! [`ConfigError`] and abort startup.

use std::path::Path;

use embedgate_types::backend::BackendKind;
use embedgate_types::config::GatewayConfig;
use embedgate_types::error::ConfigError;

/// Load configuration from `path`, or defaults when no path is given.
pub async fn load_gateway_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let Some(path) = path else {
        tracing::debug!("No config file given, using defaults");
        return Ok(GatewayConfig::default());
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;

    let config: GatewayConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;

    validate_config(&config)?;
    Ok(config)
}

/// Check that the configured backend has what its kind needs.
pub fn validate_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    let Some(backend) = &config.backend else {
        return Ok(());
    };

    if backend.location.trim().is_empty() {
        return Err(match backend.kind {
            BackendKind::Local => ConfigError::MissingModelPath,
            kind => ConfigError::MissingEndpoint(kind.to_string()),
        });
    }
    Ok(())
}

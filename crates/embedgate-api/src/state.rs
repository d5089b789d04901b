//! Application state wiring the dispatch core together.
//!
//! The registry is owned here, created once at startup, and shared by
//! handle with the dispatcher and the health endpoint. AppState pins the
//! core generics to the infra loader.

use std::sync::Arc;

use embedgate_core::dispatcher::InferenceDispatcher;
use embedgate_core::registry::AdapterRegistry;
use embedgate_infra::backend::ConfiguredBackendLoader;
use embedgate_types::config::GatewayConfig;

/// Concrete type aliases for the core generics pinned to infra implementations.
pub type ConcreteRegistry = AdapterRegistry<ConfiguredBackendLoader>;

pub type ConcreteDispatcher = InferenceDispatcher<ConfiguredBackendLoader>;

/// Shared application state used by the CLI and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ConcreteDispatcher>,
    pub registry: Arc<ConcreteRegistry>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Wire the registry and dispatcher from a validated configuration.
    ///
    /// No backend is constructed here; the registry loads it on first use.
    pub fn new(config: GatewayConfig) -> Self {
        let loader = ConfiguredBackendLoader::new(config.backend.clone(), config.backend_timeout());
        let registry = Arc::new(AdapterRegistry::new(loader));
        let dispatcher = InferenceDispatcher::new(Arc::clone(&registry), config.request_deadline())
            .with_input_normalization(config.normalize_input);

        Self {
            dispatcher: Arc::new(dispatcher),
            registry,
            config: Arc::new(config),
        }
    }

    /// Backend protocol name for logs and spans.
    pub fn provider_name(&self) -> String {
        self.config
            .backend
            .as_ref()
            .map(|b| b.kind.to_string())
            .unwrap_or_else(|| embedgate_observe::span_attrs::PROVIDER_NONE.to_string())
    }

    /// Configured model identifier, empty when no backend is configured.
    pub fn model_name(&self) -> &str {
        self.config
            .backend
            .as_ref()
            .map(|b| b.model.as_str())
            .unwrap_or("")
    }
}

//! Adapter registry: constructs the configured backend exactly once.
//!
//! The first call to [`AdapterRegistry::get`] runs the [`BackendLoader`].
//! Its outcome, ready adapter or recorded load failure, is cached for the
//! lifetime of the registry. There is no retry and no hot reload; recovering
//! from a failed load takes a restart.

use std::future::Future;

use tokio::sync::OnceCell;

use embedgate_types::backend::BackendDescriptor;
use embedgate_types::error::LoadError;

use super::backend::box_backend::BoxBackend;

/// Builds the configured backend adapter.
///
/// Implementations live in embedgate-infra.
pub trait BackendLoader: Send + Sync {
    /// The descriptor this loader builds from, if any backend is configured.
    fn descriptor(&self) -> Option<&BackendDescriptor>;

    /// Attempt to construct the backend.
    fn load(&self) -> impl Future<Output = Result<BoxBackend, LoadError>> + Send;
}

/// Lifecycle of the cached adapter as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStatus {
    Uninitialized,
    Ready,
    FailedInit,
}

impl AdapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterStatus::Uninitialized => "uninitialized",
            AdapterStatus::Ready => "ready",
            AdapterStatus::FailedInit => "failed_init",
        }
    }
}

/// Terminal states. `Uninitialized` is the empty cell.
enum AdapterState {
    Ready(BoxBackend),
    FailedInit(LoadError),
}

/// Lazily constructs and caches exactly one backend adapter.
pub struct AdapterRegistry<L> {
    loader: L,
    state: OnceCell<AdapterState>,
}

impl<L: BackendLoader> AdapterRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            state: OnceCell::new(),
        }
    }

    /// Resolve the adapter, loading it on first use.
    ///
    /// Concurrent first callers wait on a single load attempt. Load failures
    /// are logged and recorded; they are never returned as errors.
    pub async fn get(&self) -> Option<&BoxBackend> {
        let state = self
            .state
            .get_or_init(|| async {
                match self.loader.load().await {
                    Ok(backend) => {
                        tracing::info!(backend = %backend.kind(), "Backend adapter ready");
                        AdapterState::Ready(backend)
                    }
                    Err(LoadError::NotConfigured) => {
                        tracing::info!("No backend configured, serving fallback embeddings");
                        AdapterState::FailedInit(LoadError::NotConfigured)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Backend adapter failed to initialize");
                        AdapterState::FailedInit(err)
                    }
                }
            })
            .await;

        match state {
            AdapterState::Ready(backend) => Some(backend),
            AdapterState::FailedInit(_) => None,
        }
    }

    /// The recorded load failure, if initialization already ran and failed.
    pub fn init_failure(&self) -> Option<&LoadError> {
        match self.state.get() {
            Some(AdapterState::FailedInit(err)) => Some(err),
            _ => None,
        }
    }

    pub fn status(&self) -> AdapterStatus {
        match self.state.get() {
            None => AdapterStatus::Uninitialized,
            Some(AdapterState::Ready(_)) => AdapterStatus::Ready,
            Some(AdapterState::FailedInit(_)) => AdapterStatus::FailedInit,
        }
    }

    pub fn descriptor(&self) -> Option<&BackendDescriptor> {
        self.loader.descriptor()
    }
}

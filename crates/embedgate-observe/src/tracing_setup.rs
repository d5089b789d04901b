//! Process-wide tracing for the gateway.
//!
//! One `fmt` layer writes structured log lines (with close timings for the
//! per-request `gen_ai.embeddings` span). With OpenTelemetry enabled, the
//! same spans are also exported through the stdout span exporter.
//!
//! ```no_run
//! embedgate_observe::tracing_setup::init_tracing("info", false)?;
//! // ... serve ...
//! embedgate_observe::tracing_setup::shutdown_tracing();
//! # Ok::<(), embedgate_observe::tracing_setup::TracingError>(())
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Instrumentation scope reported on exported spans.
const TRACER_NAME: &str = "embedgate";

/// Provider kept for the flush in [`shutdown_tracing`]. Unset without OTel.
static OTEL_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// `RUST_LOG` when set and valid, otherwise `fallback`.
fn env_filter(fallback: &str) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(fallback),
    }
}

fn stdout_provider() -> SdkTracerProvider {
    SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build()
}

/// Install the global subscriber.
///
/// `default_directive` applies when `RUST_LOG` is unset. `enable_otel` adds
/// the OpenTelemetry bridge and registers its provider globally.
pub fn init_tracing(default_directive: &str, enable_otel: bool) -> Result<(), TracingError> {
    let otel_layer = enable_otel.then(|| {
        let provider = OTEL_PROVIDER.get_or_init(stdout_provider).clone();
        opentelemetry::global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME))
    });

    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .with(otel_layer)
        .try_init()?;

    tracing::debug!(otel = enable_otel, "tracing initialized");
    Ok(())
}

/// Flush and stop span export. No-op when OTel was never enabled.
pub fn shutdown_tracing() {
    let Some(provider) = OTEL_PROVIDER.get() else {
        return;
    };
    if let Err(e) = provider.shutdown() {
        tracing::warn!(error = %e, "OpenTelemetry provider shutdown failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_without_otel_is_noop() {
        shutdown_tracing();
        assert!(OTEL_PROVIDER.get().is_none());
    }

    #[test]
    fn test_second_install_reports_already_installed() {
        // Either call may be the first to install; the later one must fail.
        let _ = init_tracing("warn", false);
        let err = init_tracing("warn", false).unwrap_err();
        assert!(matches!(err, TracingError::AlreadyInstalled(_)));
        assert!(err.to_string().starts_with("tracing subscriber already installed"));
    }
}

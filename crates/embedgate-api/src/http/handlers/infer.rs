//! Inference endpoint.
//!
//! POST /infer - Produce a 128-dimensional embedding for the request.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::Instrument;

use embedgate_observe::span_attrs::{OP_EMBEDDINGS, OUTCOME_UNAVAILABLE};
use embedgate_types::error::DispatchError;
use embedgate_types::request::{InferenceRequest, InferenceResponse};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /infer - Dispatch to the configured backend with deterministic fallback.
///
/// Fallback embeddings are a normal 200 response. 503 means the configured
/// local model file is missing; 500 means the dispatch task itself failed.
pub async fn infer(
    State(state): State<AppState>,
    payload: Result<Json<InferenceRequest>, JsonRejection>,
) -> Result<Json<InferenceResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let request_id = uuid::Uuid::now_v7();

    let span = tracing::info_span!(
        "gen_ai.embeddings",
        request_id = %request_id,
        modality = %request.modality,
        input_len = request.input().len(),
        gen_ai.operation.name = OP_EMBEDDINGS,
        gen_ai.provider.name = %state.provider_name(),
        gen_ai.request.model = state.model_name(),
        embedgate.outcome = tracing::field::Empty,
    );

    // Run on its own task so a panic in a backend becomes a 500 instead of
    // tearing down the connection.
    let dispatcher = std::sync::Arc::clone(&state.dispatcher);
    let task_span = span.clone();
    let result = tokio::spawn(
        async move { dispatcher.handle(&request).await }.instrument(task_span),
    )
    .await
    .map_err(|e| {
        tracing::error!(parent: &span, error = %e, "Inference task failed");
        AppError::Internal(e.to_string())
    })?;

    match result {
        Ok(dispatched) => {
            span.record("embedgate.outcome", dispatched.source.label());
            let message = dispatched.message().map(str::to_string);
            Ok(Json(InferenceResponse::ok(dispatched.embedding, message)))
        }
        Err(err) => {
            if matches!(err, DispatchError::ModelUnavailable(_)) {
                span.record("embedgate.outcome", OUTCOME_UNAVAILABLE);
            }
            tracing::warn!(parent: &span, error = %err, "Inference request rejected");
            Err(err.into())
        }
    }
}

//! GET /health - Liveness plus adapter status (no auth required).

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.config.backend.as_ref().map(|b| b.kind),
        "adapter": state.registry.status().as_str(),
    }))
}

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::SharedState;

/// `GET /health`
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "fhir_base_url": state.config.smart.base_url(),
        "sessions": state.sessions.len().await,
    }))
}

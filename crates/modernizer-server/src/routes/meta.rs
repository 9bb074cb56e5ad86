use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
pub async fn health(State(app): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "default_model": app.config.default_model,
        "region": app.config.region,
    }))
}

/// GET /models: the models a client may pass as `model_id`.
pub async fn models(State(app): State<AppState>) -> Json<Value> {
    Json(json!({
        "default": app.config.default_model,
        "available": app.config.models,
    }))
}

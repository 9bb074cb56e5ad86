use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use modernizer_core::{RunRequestBody, SystemPrompt};

use crate::bridge::{sse, start_run, RunSpec};
use crate::error::AppError;
use crate::state::AppState;

/// POST /analyze: stream a full modernization report.
pub async fn analyze(
    State(app): State<AppState>,
    body: Result<Json<RunRequestBody>, JsonRejection>,
) -> Result<Response, AppError> {
    start(app, body, SystemPrompt::Report)
}

/// POST /chat: stream an answer to one question about the repository.
pub async fn chat(
    State(app): State<AppState>,
    body: Result<Json<RunRequestBody>, JsonRejection>,
) -> Result<Response, AppError> {
    start(app, body, SystemPrompt::Question)
}

/// Validate, reserve a worker, and open the event stream. Every failure
/// here is a plain JSON error response; once the stream is open, failures
/// travel as `error` events instead.
fn start(
    app: AppState,
    body: Result<Json<RunRequestBody>, JsonRejection>,
    mode: SystemPrompt,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    let request = body.validate(&app.config.default_model, mode)?;

    let spec = RunSpec::new(&request, mode, &app.config.region, &app.tools);
    let handle = start_run(&app.pool, Arc::clone(&app.agents), spec)?;

    tracing::info!(
        run_id = %handle.run_id(),
        ?mode,
        repo = %request.repo_url,
        branch = %request.branch,
        model = %request.model_id,
        "run started"
    );
    Ok(sse::event_stream(handle))
}

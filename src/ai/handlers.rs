use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    ai::{dispatcher::AiReply, dto::AiRequest, operation::AiOperation},
    error::{AppError, AppJson},
    state::AppState,
};

pub fn ai_routes() -> Router<AppState> {
    Router::new().route("/ai/:operation", post(run_operation))
}

#[instrument(skip(state, payload))]
pub async fn run_operation(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    AppJson(payload): AppJson<AiRequest>,
) -> Result<Json<AiReply>, AppError> {
    let operation: AiOperation = operation
        .parse()
        .map_err(|e: crate::ai::operation::UnknownOperation| AppError::NotFound(e.to_string()))?;
    let prompt = operation.prompt(payload)?;
    Ok(Json(state.ai.dispatch(operation, &prompt).await))
}

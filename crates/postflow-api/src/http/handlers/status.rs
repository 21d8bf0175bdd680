//! Service status handler.

use std::time::Instant;

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use uuid::Uuid;

use postflow_types::workflow::WorkflowFilter;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Snapshot of the running service.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub workflows_loaded: usize,
    pub providers: Vec<String>,
    pub live_executions: usize,
}

/// Build the status sub-router, mounted at `/api/v1`.
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

/// GET /api/v1/status - Report catalog size, registered providers, and
/// currently live executions.
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatusReport>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let report = StatusReport {
        status: "running",
        workflows_loaded: state.catalog.list(WorkflowFilter::All).await.len(),
        providers: state
            .dispatcher
            .provider_names()
            .into_iter()
            .map(String::from)
            .collect(),
        live_executions: state.executor.live_executions().len(),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(report, request_id, elapsed).with_link("self", "/api/v1/status");
    Ok(Json(resp))
}

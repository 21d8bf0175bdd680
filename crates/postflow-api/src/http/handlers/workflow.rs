//! Workflow handlers: create, list, show, execute.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use postflow_core::workflow::definition::WorkflowDraft;
use postflow_core::workflow::executor::ExecutionTarget;
use postflow_types::workflow::{
    ExecutionRecord, StepDefinition, WorkflowDefinition, WorkflowFilter,
};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for listing workflows.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// all (default), predefined, or custom.
    #[serde(default)]
    pub filter: WorkflowFilter,
}

/// Body for executing a workflow.
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    /// Initial parameters seeding the execution context.
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Body for executing an ad-hoc step list without registering a workflow.
#[derive(Debug, Deserialize)]
pub struct InlineExecuteRequest {
    /// Steps to run in order, under `continue_on_error`.
    pub steps: Vec<StepDefinition>,
    /// Initial parameters seeding the execution context.
    #[serde(default)]
    pub params: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the workflow sub-router, mounted at `/api/v1`.
pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/workflows", post(create_workflow))
        .route("/workflows", get(list_workflows))
        .route("/workflows/{id}", get(get_workflow))
        .route("/workflows/{id}/execute", post(execute_workflow))
        .route("/execute", post(execute_inline))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/workflows - Create a custom workflow from a draft.
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(draft): Json<WorkflowDraft>,
) -> Result<Json<ApiResponse<WorkflowDefinition>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let def = state.catalog.create(draft).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let link = format!("/api/v1/workflows/{}", def.id);
    let resp = ApiResponse::success(def, request_id, elapsed).with_link("self", &link);

    Ok(Json(resp))
}

/// GET /api/v1/workflows - List workflow definitions.
pub async fn list_workflows(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<WorkflowDefinition>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let defs = state.catalog.list(query.filter).await;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(defs, request_id, elapsed)
        .with_link("self", "/api/v1/workflows");

    Ok(Json(resp))
}

/// GET /api/v1/workflows/:id - Show a workflow definition.
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<WorkflowDefinition>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let def = state
        .catalog
        .lookup(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Workflow '{id}' not found")))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let link = format!("/api/v1/workflows/{}", def.id);
    let execute_link = format!("/api/v1/workflows/{}/execute", def.id);
    let resp = ApiResponse::success(def, request_id, elapsed)
        .with_link("self", &link)
        .with_link("execute", &execute_link);

    Ok(Json(resp))
}

/// POST /api/v1/workflows/:id/execute - Run a workflow and return its record.
pub async fn execute_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ApiResponse<ExecutionRecord>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let record = state
        .executor
        .execute(ExecutionTarget::Workflow(id), request.params)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let link = format!("/api/v1/workflows/{}", record.workflow_id);
    let resp = ApiResponse::success(record, request_id, elapsed).with_link("workflow", &link);

    Ok(Json(resp))
}

/// POST /api/v1/execute - Run an ad-hoc step list and return its record.
pub async fn execute_inline(
    State(state): State<AppState>,
    Json(request): Json<InlineExecuteRequest>,
) -> Result<Json<ApiResponse<ExecutionRecord>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let record = state
        .executor
        .execute(ExecutionTarget::Inline(request.steps), request.params)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(record, request_id, elapsed)))
}

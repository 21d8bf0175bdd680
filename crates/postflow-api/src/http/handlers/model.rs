//! Image-model handlers: list, select, enable, disable.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use uuid::Uuid;

use postflow_core::media::registry::ModelSummary;
use postflow_types::model::{SelectedModel, SelectionStrategy};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for listing models.
#[derive(Debug, Default, Deserialize)]
pub struct ListModelsQuery {
    /// Include disabled models in the listing.
    #[serde(default)]
    pub include_disabled: bool,
}

/// Body for selecting a model.
#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    /// Selection strategy; defaults to the catalog's configured strategy.
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
    /// Preferred model id.
    #[serde(default)]
    pub preferred_model: Option<String>,
    /// Desired aspect ratio.
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
}

fn default_aspect_ratio() -> String {
    "3:4".to_string()
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the model sub-router, mounted at `/api/v1`.
pub fn model_routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(list_models))
        .route("/models/select", post(select_model))
        .route("/models/{id}/enable", post(enable_model))
        .route("/models/{id}/disable", post(disable_model))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/models - List image generation models.
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ListModelsQuery>,
) -> Result<Json<ApiResponse<Vec<ModelSummary>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let models = state.models.list_models(query.include_disabled);

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(models, request_id, elapsed).with_link("self", "/api/v1/models");
    Ok(Json(resp))
}

/// POST /api/v1/models/select - Pick a model for a generation request.
pub async fn select_model(
    State(state): State<AppState>,
    Json(request): Json<SelectModelRequest>,
) -> Result<Json<ApiResponse<SelectedModel>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let selected = state
        .models
        .select_model(
            request.strategy,
            request.preferred_model.as_deref(),
            &request.aspect_ratio,
        )
        .ok_or_else(|| AppError::NotFound("No suitable image model is enabled".to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(selected, request_id, elapsed)))
}

/// POST /api/v1/models/:id/enable - Enable a model.
pub async fn enable_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    set_enabled(state, id, true)
}

/// POST /api/v1/models/:id/disable - Disable a model.
pub async fn disable_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    set_enabled(state, id, false)
}

fn set_enabled(
    state: AppState,
    id: String,
    enabled: bool,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if !state.models.set_enabled(&id, enabled) {
        return Err(AppError::NotFound(format!("Model '{id}' not found")));
    }

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({ "id": id, "enabled": enabled }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}

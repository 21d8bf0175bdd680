//! Top-level router assembly.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{model, status, workflow};

/// Build the full application router with middleware.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(workflow::workflow_routes())
        .merge(model::model_routes())
        .merge(status::status_routes());

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

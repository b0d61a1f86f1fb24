//! POST /api/sale/reset — test/admin-only, intended for tests and not
//! exposed on the production surface. Compiled only when the
//! `admin-routes` feature is enabled; the feature defaults OFF — a
//! flash-sale deployment should not ship the ability to wipe the ledger
//! unless explicitly opted in.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use super::super::state::AppState;
use super::super::types::ApiError;

#[utoipa::path(
    post,
    path = "/api/sale/reset",
    responses(
        (status = 200, description = "Stock and ledger reset"),
        (status = 404, description = "Admin routes disabled at runtime"),
        (status = 503, description = "Atomic Store unavailable"),
        (status = 500, description = "Atomic Store protocol violation (bug)")
    ),
    tag = "Admin"
)]
pub async fn reset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.admin_routes_enabled {
        return Err(ApiError::not_found("admin routes are disabled"));
    }
    state.coordinator.reset().await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

//! GET /api/sale/status

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use super::super::state::AppState;
use super::super::types::{ApiError, SaleStatusResponse};

#[utoipa::path(
    get,
    path = "/api/sale/status",
    responses(
        (status = 200, description = "Current sale status", body = SaleStatusResponse),
        (status = 503, description = "Atomic Store unavailable"),
        (status = 500, description = "Atomic Store protocol violation (bug)")
    ),
    tag = "Sale"
)]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SaleStatusResponse>, ApiError> {
    let status = state.coordinator.get_status().await?;
    Ok(Json(status.into()))
}

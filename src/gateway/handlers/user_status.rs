//! GET /api/sale/purchase/:userId

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use super::super::state::AppState;
use super::super::types::{ApiError, UserStatusResponse};

#[utoipa::path(
    get,
    path = "/api/sale/purchase/{userId}",
    params(("userId" = String, Path, description = "Raw user identifier")),
    responses(
        (status = 200, description = "Purchase status for this user", body = UserStatusResponse),
        (status = 400, description = "Empty user id"),
        (status = 503, description = "Atomic Store unavailable"),
        (status = 500, description = "Atomic Store protocol violation (bug)")
    ),
    tag = "Sale"
)]
pub async fn get_user_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStatusResponse>, ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::bad_request("userId must not be empty"));
    }

    let status = state.coordinator.get_user_status(&user_id).await?;
    Ok(Json(status.into()))
}

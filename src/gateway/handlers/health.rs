//! GET /api/sale/health — ambient liveness/readiness check. Pings the
//! Atomic Store so a dead Redis surfaces before a client hits `/purchase`.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use super::super::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub healthy: bool,
    pub git_hash: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/sale/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Atomic Store unreachable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.coordinator.get_status().await.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            healthy,
            git_hash: env!("GIT_HASH"),
        }),
    )
}

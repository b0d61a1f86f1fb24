//! POST /api/sale/purchase

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use super::super::state::AppState;
use super::super::types::{PurchaseFailureReason, PurchaseRequest, purchase_response};
use crate::sale::PurchaseOutcome;

const MAX_USER_ID_LEN: usize = 255;

#[utoipa::path(
    post,
    path = "/api/sale/purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Purchase succeeded"),
        (status = 400, description = "Invalid user id"),
        (status = 403, description = "Sale window not active"),
        (status = 409, description = "Already purchased or out of stock"),
        (status = 503, description = "Atomic Store unavailable"),
        (status = 500, description = "Atomic Store protocol violation (bug)")
    ),
    tag = "Sale"
)]
pub async fn attempt_purchase(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PurchaseRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    if req.user_id.len() > MAX_USER_ID_LEN {
        return purchase_response(PurchaseOutcome::InvalidUserId);
    }

    let outcome = match state.coordinator.attempt_purchase(&req.user_id).await {
        Ok(outcome) => outcome,
        Err(err) => {
            return super::super::types::store_error_response(err);
        }
    };

    tracing::info!(
        reason = ?purchase_outcome_reason(&outcome),
        "purchase attempt resolved"
    );

    purchase_response(outcome)
}

fn purchase_outcome_reason(outcome: &PurchaseOutcome) -> Option<PurchaseFailureReason> {
    match outcome {
        PurchaseOutcome::Success { .. } => None,
        PurchaseOutcome::InvalidUserId => Some(PurchaseFailureReason::InvalidUserId),
        PurchaseOutcome::SaleNotActive { .. } => Some(PurchaseFailureReason::SaleNotActive),
        PurchaseOutcome::AlreadyPurchased { .. } => Some(PurchaseFailureReason::AlreadyPurchased),
        PurchaseOutcome::OutOfStock => Some(PurchaseFailureReason::OutOfStock),
    }
}

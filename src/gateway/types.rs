//! Wire types for the HTTP surface: the seam where the Sale Coordinator's
//! domain types get turned into the JSON shapes clients expect —
//! `success`/`reason`/`message` envelopes with camelCase fields.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::sale::{PurchaseOutcome, SaleState, SaleStatus, UserStatus};
use crate::store::StoreError;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Raw (un-normalized) user identifier, 1..255 bytes.
    #[schema(example = "alice@example.com")]
    pub user_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatusResponse {
    pub status: &'static str,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub remaining_stock: i64,
    pub total_stock: i64,
    pub product_name: String,
    pub product_price: String,
    pub server_time: DateTime<Utc>,
}

impl From<SaleStatus> for SaleStatusResponse {
    fn from(status: SaleStatus) -> Self {
        Self {
            status: sale_state_label(status.state),
            starts_at: status.starts_at,
            ends_at: status.ends_at,
            remaining_stock: status.remaining_stock,
            total_stock: status.total_stock,
            product_name: status.product_name,
            product_price: status.product_price,
            server_time: status.server_time,
        }
    }
}

fn sale_state_label(state: SaleState) -> &'static str {
    match state {
        SaleState::Upcoming => "upcoming",
        SaleState::Active => "active",
        SaleState::Ended => "ended",
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusResponse {
    pub has_purchased: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<String>,
}

impl From<UserStatus> for UserStatusResponse {
    fn from(status: UserStatus) -> Self {
        Self {
            has_purchased: status.has_purchased,
            purchased_at: status.purchased_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSuccessResponse {
    pub success: bool,
    pub message: String,
    pub purchased_at: String,
}

/// Machine-readable rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseFailureReason {
    AlreadyPurchased,
    OutOfStock,
    SaleNotActive,
    InvalidUserId,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseFailureResponse {
    pub success: bool,
    pub reason: PurchaseFailureReason,
    pub message: String,
}

/// Turns an SC outcome into the HTTP status + body the client expects.
/// No business logic lives here — only translation.
pub fn purchase_response(outcome: PurchaseOutcome) -> (StatusCode, Json<serde_json::Value>) {
    match outcome {
        PurchaseOutcome::Success { purchased_at } => (
            StatusCode::OK,
            Json(
                serde_json::to_value(PurchaseSuccessResponse {
                    success: true,
                    message: "Purchase successful".to_string(),
                    purchased_at,
                })
                .expect("PurchaseSuccessResponse is always serializable"),
            ),
        ),
        PurchaseOutcome::InvalidUserId => failure_response(
            StatusCode::BAD_REQUEST,
            PurchaseFailureReason::InvalidUserId,
            "userId must be a non-empty string",
        ),
        PurchaseOutcome::SaleNotActive { state } => {
            let message = match state {
                SaleState::Upcoming => "The sale has not started yet",
                SaleState::Ended => "The sale has ended",
                SaleState::Active => unreachable!("SaleNotActive is only produced for Upcoming/Ended"),
            };
            failure_response(
                StatusCode::FORBIDDEN,
                PurchaseFailureReason::SaleNotActive,
                message,
            )
        }
        PurchaseOutcome::AlreadyPurchased { .. } => failure_response(
            StatusCode::CONFLICT,
            PurchaseFailureReason::AlreadyPurchased,
            "This user has already purchased",
        ),
        PurchaseOutcome::OutOfStock => failure_response(
            StatusCode::CONFLICT,
            PurchaseFailureReason::OutOfStock,
            "This item is out of stock",
        ),
    }
}

/// Renders an AS-boundary failure as a purchase-endpoint response body,
/// using the same envelope shape as [`purchase_response`].
pub fn store_error_response(err: StoreError) -> (StatusCode, Json<serde_json::Value>) {
    let api_err: ApiError = err.into();
    (
        api_err.status,
        Json(serde_json::json!({ "success": false, "message": api_err.message })),
    )
}

fn failure_response(
    status: StatusCode,
    reason: PurchaseFailureReason,
    message: &str,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(
            serde_json::to_value(PurchaseFailureResponse {
                success: false,
                reason,
                message: message.to_string(),
            })
            .expect("PurchaseFailureResponse is always serializable"),
        ),
    )
}

/// Unified error type for AS-boundary failures. Enables the `?` operator
/// in handlers.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transient(msg) => {
                tracing::error!("atomic store unavailable: {msg}");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "Service Unavailable".to_string(),
                }
            }
            StoreError::ProtocolViolation(msg) => {
                tracing::error!("atomic store protocol violation (bug): {msg}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal Server Error".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(serde_json::json!({ "success": false, "message": self.message })),
        )
            .into_response()
    }
}

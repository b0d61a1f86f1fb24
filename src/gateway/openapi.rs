//! OpenAPI / Swagger UI documentation for the flash-sale HTTP surface.
//!
//! - Swagger UI: `http://<host>:<port>/docs`
//! - OpenAPI JSON: `http://<host>:<port>/api-docs/openapi.json`

use utoipa::OpenApi;

use super::handlers::{
    health::HealthResponse,
    purchase,
    status,
    user_status,
};
use super::types::{PurchaseRequest, SaleStatusResponse, UserStatusResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Flash Sale Purchase Service",
        version = "1.0.0",
        description = "Bounded-stock, one-purchase-per-user flash sale API.",
        license(name = "MIT")
    ),
    paths(
        health::health_check,
        status::get_status,
        purchase::attempt_purchase,
        user_status::get_user_status,
    ),
    components(schemas(
        HealthResponse,
        SaleStatusResponse,
        PurchaseRequest,
        UserStatusResponse,
    )),
    tags(
        (name = "Sale", description = "Sale status and purchase endpoints"),
        (name = "System", description = "Health checks"),
        (name = "Admin", description = "Test/admin-only endpoints, gated behind the admin-routes feature")
    )
)]
pub struct ApiDoc;

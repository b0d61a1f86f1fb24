//! End-to-end exercises of the HTTP surface, driven in-process against
//! `gateway::build_router` via `tower::ServiceExt::oneshot` — no bound
//! TCP listener and no live Redis required.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use flash_sale_service::config::{AppConfig, LogFormat, SaleConfig};
use flash_sale_service::gateway::build_router;
use flash_sale_service::sale::SaleCoordinator;
use flash_sale_service::store::InMemoryStore;

fn test_config(sale: SaleConfig) -> AppConfig {
    AppConfig {
        sale,
        host: "127.0.0.1".to_string(),
        port: 0,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        cors_origin: "*".to_string(),
        rate_limit_max: 10_000,
        rate_limit_window_secs: 1,
        admin_routes: false,
        log_level: "error".to_string(),
        log_format: LogFormat::Text,
    }
}

fn active_sale(total_stock: i64) -> SaleConfig {
    let now = Utc::now();
    SaleConfig {
        start_time: now - Duration::seconds(60),
        end_time: now + Duration::seconds(60),
        total_stock,
        product_name: "Integration Test Item".to_string(),
        product_price: "19.99".to_string(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is valid JSON")
}

#[tokio::test]
async fn health_check_reports_healthy_against_a_live_store() {
    let coordinator = Arc::new(SaleCoordinator::new(
        Arc::new(InMemoryStore::new()),
        active_sale(5),
    ));
    let router = build_router(&test_config(active_sale(5)), coordinator);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/sale/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["healthy"], Value::Bool(true));
}

#[tokio::test]
async fn status_reflects_configured_stock_before_any_purchase() {
    let sale = active_sale(7);
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    coordinator.initialize().await.unwrap();
    let router = build_router(&test_config(sale), coordinator);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/sale/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "active");
    assert_eq!(body["remainingStock"], 7);
    assert_eq!(body["totalStock"], 7);
}

#[tokio::test]
async fn first_purchase_succeeds_and_second_for_the_same_user_is_rejected() {
    let sale = active_sale(5);
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    coordinator.initialize().await.unwrap();
    let router = build_router(&test_config(sale), coordinator);

    let purchase_req = |user_id: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/sale/purchase")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "userId": user_id }).to_string(),
            ))
            .unwrap()
    };

    let first = router.clone().oneshot(purchase_req("shopper-1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = body_json(first).await;
    assert_eq!(first_body["success"], Value::Bool(true));

    // Same user, different casing/whitespace: still a duplicate.
    let second = router
        .clone()
        .oneshot(purchase_req("  Shopper-1  "))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let second_body = body_json(second).await;
    assert_eq!(second_body["reason"], "already_purchased");

    let status = router
        .oneshot(
            Request::builder()
                .uri("/api/sale/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status_body = body_json(status).await;
    assert_eq!(status_body["remainingStock"], 4);
}

#[tokio::test]
async fn purchases_beyond_stock_are_rejected_as_out_of_stock() {
    let sale = active_sale(2);
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    coordinator.initialize().await.unwrap();
    let router = build_router(&test_config(sale), coordinator);

    let purchase_req = |user_id: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/sale/purchase")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "userId": user_id }).to_string(),
            ))
            .unwrap()
    };

    for user in ["a", "b"] {
        let response = router.clone().oneshot(purchase_req(user)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let third = router.clone().oneshot(purchase_req("c")).await.unwrap();
    assert_eq!(third.status(), StatusCode::CONFLICT);
    let third_body = body_json(third).await;
    assert_eq!(third_body["reason"], "out_of_stock");
}

#[tokio::test]
async fn purchase_before_the_sale_window_opens_is_forbidden() {
    let now = Utc::now();
    let sale = SaleConfig {
        start_time: now + Duration::seconds(60),
        end_time: now + Duration::seconds(120),
        total_stock: 10,
        product_name: "Upcoming Item".to_string(),
        product_price: "1.00".to_string(),
    };
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    coordinator.initialize().await.unwrap();
    let router = build_router(&test_config(sale), coordinator);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sale/purchase")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({ "userId": "early-bird" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["reason"], "sale_not_active");
}

#[tokio::test]
async fn empty_user_id_is_rejected_before_touching_the_store() {
    let sale = active_sale(5);
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    coordinator.initialize().await.unwrap();
    let router = build_router(&test_config(sale), coordinator);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sale/purchase")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({ "userId": "   " }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["reason"], "invalid_user_id");
}

#[tokio::test]
async fn user_status_reports_purchase_history() {
    let sale = active_sale(5);
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    coordinator.initialize().await.unwrap();
    let router = build_router(&test_config(sale), coordinator);

    let before = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sale/purchase/dana")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(before.status(), StatusCode::OK);
    assert_eq!(body_json(before).await["hasPurchased"], Value::Bool(false));

    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sale/purchase")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({ "userId": "dana" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let after = router
        .oneshot(
            Request::builder()
                .uri("/api/sale/purchase/DANA")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::OK);
    let after_body = body_json(after).await;
    assert_eq!(after_body["hasPurchased"], Value::Bool(true));
    assert!(after_body["purchasedAt"].is_string());
}

#[tokio::test]
async fn reset_route_is_unmounted_without_the_admin_routes_feature() {
    let sale = active_sale(5);
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    let router = build_router(&test_config(sale), coordinator);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sale/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let sale = active_sale(5);
    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(InMemoryStore::new()), sale.clone()));
    let router = build_router(&test_config(sale), coordinator);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["info"]["title"], "Flash Sale Purchase Service");
}

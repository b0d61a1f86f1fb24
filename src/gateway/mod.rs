pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::sale::SaleCoordinator;
use state::AppState;

fn cors_layer(cors_origin: &str) -> CorsLayer {
    if cors_origin.trim() == "*" {
        CorsLayer::new().allow_origin(Any).allow_methods(Any)
    } else {
        match cors_origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new().allow_origin(origin).allow_methods(Any),
            Err(_) => {
                tracing::warn!("CORS_ORIGIN {cors_origin:?} is not a valid header value; falling back to no CORS");
                CorsLayer::new()
            }
        }
    }
}

fn rate_limit_layer(config: &AppConfig) -> GovernorLayer {
    let per_second = (config.rate_limit_max as u64 / config.rate_limit_window_secs.max(1)).max(1);
    let governor_conf = Box::leak(Box::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(config.rate_limit_max.max(1))
            .finish()
            .expect("rate limit configuration is always valid (non-zero burst/interval)"),
    ));
    GovernorLayer {
        config: governor_conf,
    }
}

/// Build the router without binding a listener, so tests can drive it
/// in-process via `tower::ServiceExt::oneshot`.
pub fn build_router(config: &AppConfig, coordinator: Arc<SaleCoordinator>) -> Router {
    let state = Arc::new(AppState::new(coordinator, config.admin_routes));

    #[allow(unused_mut)]
    let mut app = Router::new()
        .route("/api/sale/health", get(handlers::health_check))
        .route("/api/sale/status", get(handlers::get_status))
        .route("/api/sale/purchase", post(handlers::attempt_purchase))
        .route(
            "/api/sale/purchase/{userId}",
            get(handlers::get_user_status),
        );

    #[cfg(feature = "admin-routes")]
    {
        if config.admin_routes {
            app = app.route("/api/sale/reset", post(handlers::reset));
        } else {
            tracing::warn!(
                "built with the admin-routes feature but ADMIN_ROUTES is not set; \
                 /api/sale/reset stays unmounted"
            );
        }
    }

    app.with_state(state)
        .layer(cors_layer(&config.cors_origin))
        .layer(rate_limit_layer(config))
        .layer(TraceLayer::new_for_http())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Build the router and serve it on `config.host:config.port`: construct
/// shared state, build the router, bind, serve.
pub async fn run_server(config: AppConfig, coordinator: Arc<SaleCoordinator>) {
    let app = build_router(&config, coordinator);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind to {addr}: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("flash-sale-service listening on http://{addr}");
    tracing::info!("API docs: http://{addr}/docs");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received, draining in-flight requests");
    tokio::time::sleep(Duration::from_millis(100)).await;
}

//! Flash Sale Purchase Service — process entry point.
//!
//! Boot sequence: load configuration (fail closed on anything malformed),
//! initialize structured logging, construct the Atomic Store client and
//! the Sale Coordinator, run `initialize()` once, then serve.

use std::sync::Arc;

use flash_sale_service::config::AppConfig;
use flash_sale_service::gateway;
use flash_sale_service::logging;
use flash_sale_service::sale::SaleCoordinator;
use flash_sale_service::store::RedisStore;

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let _logging_guard = logging::init_logging(&config);

    tracing::info!(
        total_stock = config.sale.total_stock,
        starts_at = %config.sale.start_time,
        ends_at = %config.sale.end_time,
        "starting flash-sale-service"
    );

    let store = match RedisStore::new(&config.redis_url) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("FATAL: could not construct Atomic Store client: {e}");
            std::process::exit(1);
        }
    };

    let coordinator = Arc::new(SaleCoordinator::new(Arc::new(store), config.sale.clone()));

    if let Err(e) = coordinator.initialize().await {
        tracing::error!("FATAL: failed to initialize stock counter: {e}");
        std::process::exit(1);
    }

    gateway::run_server(config, coordinator).await;
}

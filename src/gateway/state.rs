use std::sync::Arc;

use crate::sale::SaleCoordinator;

/// Gateway application state (shared across all handlers).
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SaleCoordinator>,
    /// Mirrors `ADMIN_ROUTES`/`admin-routes` at request time, so the
    /// reset handler can double-check even if it were ever reachable
    /// through an unexpected route table.
    pub admin_routes_enabled: bool,
}

impl AppState {
    pub fn new(coordinator: Arc<SaleCoordinator>, admin_routes_enabled: bool) -> Self {
        Self {
            coordinator,
            admin_routes_enabled,
        }
    }
}

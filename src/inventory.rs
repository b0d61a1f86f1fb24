//! Inventory Module (IM): owns the stock counter key. Contains no locks
//! and no in-process coordination — every mutating operation is an
//! atomic script executed server-side at the AS.

use std::sync::Arc;

use crate::store::{AtomicStore, DecrementOutcome};
use crate::store::StoreError;

pub const STOCK_KEY: &str = "flash-sale:stock";

pub struct Inventory {
    store: Arc<dyn AtomicStore>,
}

impl Inventory {
    pub fn new(store: Arc<dyn AtomicStore>) -> Self {
        Self { store }
    }

    /// Set the counter to `total_stock` iff absent. Idempotent across
    /// process restarts.
    pub async fn initialize(&self, total_stock: i64) -> Result<(), StoreError> {
        self.store.init_stock(STOCK_KEY, total_stock).await
    }

    /// Plain read; `0` if absent.
    pub async fn get_stock(&self) -> Result<i64, StoreError> {
        self.store.get_stock(STOCK_KEY).await
    }

    /// Administrative/test-only decrement. Not used on the purchase hot
    /// path (superseded by the combined atomic purchase script).
    pub async fn decrement_stock(&self) -> Result<DecrementOutcome, StoreError> {
        self.store.decrement_stock(STOCK_KEY).await
    }

    pub async fn reset_stock(&self, total_stock: i64) -> Result<(), StoreError> {
        self.store.set_stock(STOCK_KEY, total_stock).await
    }

    pub async fn set_stock(&self, value: i64) -> Result<(), StoreError> {
        self.store.set_stock(STOCK_KEY, value).await
    }
}

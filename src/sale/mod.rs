//! Sale Coordinator (SC): derives the sale state, orchestrates the
//! purchase transaction, and exposes the read endpoints. This is the top
//! of the core — `getStatus`, `attemptPurchase`, `getUserStatus`,
//! `initialize`, `reset` — with business logic kept entirely out of the
//! HTTP handlers.

pub mod window;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::SaleConfig;
use crate::inventory::Inventory;
use crate::ledger::Ledger;
use crate::normalize::normalize_user_id;
use crate::store::{AtomicStore, PurchaseScriptResult, StoreError};

pub use window::SaleState;

/// `getStatus()` response.
#[derive(Debug, Clone)]
pub struct SaleStatus {
    pub state: SaleState,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub remaining_stock: i64,
    pub total_stock: i64,
    pub product_name: String,
    pub product_price: String,
    pub server_time: DateTime<Utc>,
}

/// `getUserStatus()` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatus {
    pub has_purchased: bool,
    pub purchased_at: Option<String>,
}

/// The purchase state machine's outcome, as a tagged result rather than
/// an exception type. HTTP mapping is a pure function of this enum (see
/// `gateway::types`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Success { purchased_at: String },
    InvalidUserId,
    SaleNotActive { state: SaleState },
    AlreadyPurchased { purchased_at: String },
    OutOfStock,
}

pub struct SaleCoordinator {
    store: Arc<dyn AtomicStore>,
    inventory: Inventory,
    ledger: Ledger,
    config: SaleConfig,
}

impl SaleCoordinator {
    pub fn new(store: Arc<dyn AtomicStore>, config: SaleConfig) -> Self {
        Self {
            inventory: Inventory::new(store.clone()),
            ledger: Ledger::new(store.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &SaleConfig {
        &self.config
    }

    /// Idempotently sets the counter to `total_stock` iff absent. Intended
    /// to run once at process startup.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.inventory.initialize(self.config.total_stock).await
    }

    /// Unconditionally resets the counter and empties the ledger.
    /// Test/admin-only — not exposed on the production router by default.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.inventory.reset_stock(self.config.total_stock).await?;
        self.ledger.clear_purchases().await
    }

    /// Reads the stock counter once; never fails absent AS outage is not
    /// guaranteed at this layer — an AS outage still surfaces as
    /// `StoreError::Transient` and the HTTP layer maps it to 500 (spec
    /// §6.1).
    pub async fn get_status(&self) -> Result<SaleStatus, StoreError> {
        let now = Utc::now();
        let remaining_stock = self.inventory.get_stock().await?;
        Ok(SaleStatus {
            state: window::derive_state(now, self.config.start_time, self.config.end_time),
            starts_at: self.config.start_time,
            ends_at: self.config.end_time,
            remaining_stock,
            total_stock: self.config.total_stock,
            product_name: self.config.product_name.clone(),
            product_price: self.config.product_price.clone(),
            server_time: now,
        })
    }

    pub async fn get_user_status(&self, raw_user_id: &str) -> Result<UserStatus, StoreError> {
        let normalized = normalize_user_id(raw_user_id).unwrap_or_default();
        let lookup = self.ledger.has_purchased(&normalized).await?;
        Ok(UserStatus {
            has_purchased: lookup.has_purchased,
            purchased_at: lookup.purchased_at,
        })
    }

    /// The purchase state machine: validate → gate → commit. The window
    /// check runs before the atomic commit and is not part of it, so a
    /// purchase that interleaves with window expiry may still commit —
    /// acceptable since the window is a soft gate measured in seconds,
    /// not a strict global deadline.
    pub async fn attempt_purchase(&self, raw_user_id: &str) -> Result<PurchaseOutcome, StoreError> {
        let Some(normalized) = normalize_user_id(raw_user_id) else {
            return Ok(PurchaseOutcome::InvalidUserId);
        };

        let now = Utc::now();
        let state = window::derive_state(now, self.config.start_time, self.config.end_time);
        if state != SaleState::Active {
            tracing::info!(state = ?state, "purchase attempt rejected: sale window not active");
            return Ok(PurchaseOutcome::SaleNotActive { state });
        }

        let now_iso = now.to_rfc3339();
        let result = self
            .store
            .atomic_purchase(
                crate::inventory::STOCK_KEY,
                crate::ledger::LEDGER_KEY,
                &normalized,
                &now_iso,
            )
            .await?;

        Ok(match result {
            PurchaseScriptResult::Success { remaining } => {
                tracing::info!(remaining, "purchase committed");
                PurchaseOutcome::Success {
                    purchased_at: now_iso,
                }
            }
            PurchaseScriptResult::AlreadyPurchased { purchased_at } => {
                PurchaseOutcome::AlreadyPurchased { purchased_at }
            }
            PurchaseScriptResult::OutOfStock => PurchaseOutcome::OutOfStock,
        })
    }
}

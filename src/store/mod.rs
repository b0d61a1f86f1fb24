//! The Atomic Store (AS) boundary: an external single-execution-slot
//! key-value server exposing indivisible multi-step operations over the
//! stock counter and the purchase ledger.
//!
//! [`AtomicStore`] is the seam the rest of the crate programs against.
//! [`redis_store::RedisStore`] is the production implementation;
//! [`memory_store::InMemoryStore`] is a single-process fake used in tests
//! so the Sale Coordinator and HTTP layer can be exercised without a live
//! Redis.

pub mod memory_store;
pub mod redis_store;
mod scripts;

use async_trait::async_trait;
use thiserror::Error;

pub use memory_store::InMemoryStore;
pub use redis_store::RedisStore;

/// Failure modes at the AS boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection refused, timeout, or any other transport-level failure.
    /// Maps to HTTP 503; the caller should re-query rather than retry the
    /// write.
    #[error("atomic store transient failure: {0}")]
    Transient(String),

    /// The atomic script returned a shape/code the client does not
    /// recognize. Indicates a script/consumer version mismatch; maps to
    /// HTTP 500 and should be logged as a bug.
    #[error("atomic store protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Outcome of the standalone `decrementStock` admin script. Not used on
/// the purchase hot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Counter was present and positive; decremented to `remaining`.
    Decremented { remaining: i64 },
    /// Counter was present but already zero.
    Exhausted,
    /// Counter key did not exist.
    Absent,
}

/// Outcome of the standalone `recordPurchase` ledger write. Not used on
/// the purchase hot path; retained for tests and as a fallback path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    AlreadyPresent { purchased_at: String },
}

/// Outcome of the combined atomic purchase script — the heart of the
/// core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseScriptResult {
    /// Code 1: ledger entry inserted and counter decremented.
    Success { remaining: i64 },
    /// Code 0: ledger already had an entry for this user.
    AlreadyPurchased { purchased_at: String },
    /// Code 2: counter was zero or absent.
    OutOfStock,
}

/// The stock/ledger primitives the AS protocol requires, plus the
/// combined purchase script. All methods are indivisible at the AS: no
/// two concurrent invocations can interleave their reads and writes.
#[async_trait]
pub trait AtomicStore: Send + Sync {
    /// `initialize()`: set-if-absent. Idempotent across restarts.
    async fn init_stock(&self, stock_key: &str, total_stock: i64) -> Result<(), StoreError>;

    /// Plain read; `0` if absent.
    async fn get_stock(&self, stock_key: &str) -> Result<i64, StoreError>;

    /// Administrative/test-only decrement. Not used on the purchase hot
    /// path.
    async fn decrement_stock(&self, stock_key: &str) -> Result<DecrementOutcome, StoreError>;

    /// Unconditional write, used by `reset`/`setStock`.
    async fn set_stock(&self, stock_key: &str, value: i64) -> Result<(), StoreError>;

    /// Single ledger lookup (`hasPurchased`).
    async fn has_purchased(
        &self,
        ledger_key: &str,
        user_id: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Insert-if-absent ledger write (`recordPurchase`). Not used on the
    /// hot path; retained for tests and as a fallback.
    async fn record_purchase(
        &self,
        ledger_key: &str,
        user_id: &str,
        now_iso: &str,
    ) -> Result<RecordOutcome, StoreError>;

    /// Full scan; admin/debug use only.
    async fn get_all_purchases(
        &self,
        ledger_key: &str,
    ) -> Result<Vec<(String, String)>, StoreError>;

    async fn get_purchase_count(&self, ledger_key: &str) -> Result<usize, StoreError>;

    async fn clear_purchases(&self, ledger_key: &str) -> Result<(), StoreError>;

    /// The combined script: lookup, stock-check, decrement, insert, as
    /// one indivisible round trip.
    async fn atomic_purchase(
        &self,
        stock_key: &str,
        ledger_key: &str,
        user_id: &str,
        now_iso: &str,
    ) -> Result<PurchaseScriptResult, StoreError>;
}

//! Purchase Ledger (PL): owns the user→purchase-timestamp mapping. A
//! key, once present, is never overwritten.

use std::sync::Arc;

use crate::store::{AtomicStore, RecordOutcome, StoreError};

pub const LEDGER_KEY: &str = "flash-sale:purchases";

/// `hasPurchased` response (`getUserStatus`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLookup {
    pub has_purchased: bool,
    pub purchased_at: Option<String>,
}

pub struct Ledger {
    store: Arc<dyn AtomicStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn AtomicStore>) -> Self {
        Self { store }
    }

    pub async fn has_purchased(&self, user_id: &str) -> Result<PurchaseLookup, StoreError> {
        let purchased_at = self.store.has_purchased(LEDGER_KEY, user_id).await?;
        Ok(PurchaseLookup {
            has_purchased: purchased_at.is_some(),
            purchased_at,
        })
    }

    /// Insert-if-absent. Not used on the hot path (superseded by the
    /// combined purchase script); retained for tests and as a fallback
    /// path.
    pub async fn record_purchase(
        &self,
        user_id: &str,
        now_iso: &str,
    ) -> Result<RecordOutcome, StoreError> {
        self.store.record_purchase(LEDGER_KEY, user_id, now_iso).await
    }

    /// Full scan; admin/debug use only.
    pub async fn get_all_purchases(&self) -> Result<Vec<(String, String)>, StoreError> {
        self.store.get_all_purchases(LEDGER_KEY).await
    }

    pub async fn get_purchase_count(&self) -> Result<usize, StoreError> {
        self.store.get_purchase_count(LEDGER_KEY).await
    }

    pub async fn clear_purchases(&self) -> Result<(), StoreError> {
        self.store.clear_purchases(LEDGER_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn record_purchase_never_overwrites() {
        let ledger = Ledger::new(Arc::new(InMemoryStore::new()));
        let first = ledger.record_purchase("u1", "t0").await.unwrap();
        assert_eq!(first, RecordOutcome::Recorded);

        let second = ledger.record_purchase("u1", "t1").await.unwrap();
        assert_eq!(
            second,
            RecordOutcome::AlreadyPresent {
                purchased_at: "t0".to_string()
            }
        );
    }

    #[tokio::test]
    async fn has_purchased_reflects_ledger_state() {
        let ledger = Ledger::new(Arc::new(InMemoryStore::new()));
        assert_eq!(
            ledger.has_purchased("u1").await.unwrap(),
            PurchaseLookup {
                has_purchased: false,
                purchased_at: None
            }
        );

        ledger.record_purchase("u1", "t0").await.unwrap();
        assert_eq!(
            ledger.has_purchased("u1").await.unwrap(),
            PurchaseLookup {
                has_purchased: true,
                purchased_at: Some("t0".to_string())
            }
        );
    }

    #[tokio::test]
    async fn clear_purchases_resets_count() {
        let ledger = Ledger::new(Arc::new(InMemoryStore::new()));
        ledger.record_purchase("u1", "t0").await.unwrap();
        ledger.record_purchase("u2", "t1").await.unwrap();
        assert_eq!(ledger.get_purchase_count().await.unwrap(), 2);

        ledger.clear_purchases().await.unwrap();
        assert_eq!(ledger.get_purchase_count().await.unwrap(), 0);
    }
}

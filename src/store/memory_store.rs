//! In-process fake of the Atomic Store, for tests that exercise the Sale
//! Coordinator and HTTP layer without a live Redis. A single
//! [`std::sync::Mutex`] stands in for the AS's single-execution-slot
//! scripting discipline: every method below locks it for the whole of its
//! body (no `.await` while held), so concurrent callers observe the same
//! serialization the real Lua scripts provide.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{AtomicStore, DecrementOutcome, PurchaseScriptResult, RecordOutcome, StoreError};

#[derive(Default)]
struct State {
    stocks: HashMap<String, i64>,
    ledgers: HashMap<String, HashMap<String, String>>,
}

/// An in-memory stand-in for AS, used by unit and integration tests.
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AtomicStore for InMemoryStore {
    async fn init_stock(&self, stock_key: &str, total_stock: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.stocks.entry(stock_key.to_string()).or_insert(total_stock);
        Ok(())
    }

    async fn get_stock(&self, stock_key: &str) -> Result<i64, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(*state.stocks.get(stock_key).unwrap_or(&0))
    }

    async fn decrement_stock(&self, stock_key: &str) -> Result<DecrementOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.stocks.get_mut(stock_key) {
            None => Ok(DecrementOutcome::Absent),
            Some(n) if *n <= 0 => Ok(DecrementOutcome::Exhausted),
            Some(n) => {
                *n -= 1;
                Ok(DecrementOutcome::Decremented { remaining: *n })
            }
        }
    }

    async fn set_stock(&self, stock_key: &str, value: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.stocks.insert(stock_key.to_string(), value);
        Ok(())
    }

    async fn has_purchased(
        &self,
        ledger_key: &str,
        user_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ledgers
            .get(ledger_key)
            .and_then(|ledger| ledger.get(user_id))
            .cloned())
    }

    async fn record_purchase(
        &self,
        ledger_key: &str,
        user_id: &str,
        now_iso: &str,
    ) -> Result<RecordOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        let ledger = state.ledgers.entry(ledger_key.to_string()).or_default();
        if let Some(existing) = ledger.get(user_id) {
            return Ok(RecordOutcome::AlreadyPresent {
                purchased_at: existing.clone(),
            });
        }
        ledger.insert(user_id.to_string(), now_iso.to_string());
        Ok(RecordOutcome::Recorded)
    }

    async fn get_all_purchases(
        &self,
        ledger_key: &str,
    ) -> Result<Vec<(String, String)>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ledgers
            .get(ledger_key)
            .map(|ledger| ledger.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn get_purchase_count(&self, ledger_key: &str) -> Result<usize, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.ledgers.get(ledger_key).map(|l| l.len()).unwrap_or(0))
    }

    async fn clear_purchases(&self, ledger_key: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.ledgers.remove(ledger_key);
        Ok(())
    }

    async fn atomic_purchase(
        &self,
        stock_key: &str,
        ledger_key: &str,
        user_id: &str,
        now_iso: &str,
    ) -> Result<PurchaseScriptResult, StoreError> {
        let mut state = self.state.lock().unwrap();

        if let Some(existing) = state
            .ledgers
            .get(ledger_key)
            .and_then(|ledger| ledger.get(user_id))
        {
            return Ok(PurchaseScriptResult::AlreadyPurchased {
                purchased_at: existing.clone(),
            });
        }

        let stock = *state.stocks.get(stock_key).unwrap_or(&0);
        if stock <= 0 {
            return Ok(PurchaseScriptResult::OutOfStock);
        }

        let remaining = stock - 1;
        state.stocks.insert(stock_key.to_string(), remaining);
        state
            .ledgers
            .entry(ledger_key.to_string())
            .or_default()
            .insert(user_id.to_string(), now_iso.to_string());

        Ok(PurchaseScriptResult::Success { remaining })
    }
}

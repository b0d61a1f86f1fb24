//! Production [`AtomicStore`] backed by Redis. The connection is a
//! [`redis::aio::ConnectionManager`] (pools/pipelines transparently and
//! reconnects in the background once established); it is opened lazily on
//! first use, and the *first* connection attempt is retried with bounded
//! exponential backoff (at most 3 attempts, 200 ms base, capped at 2 s).

use std::time::Duration;

use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tokio::sync::OnceCell;

use super::scripts;
use super::{AtomicStore, DecrementOutcome, PurchaseScriptResult, RecordOutcome, StoreError};

static INIT_STOCK_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(scripts::INIT_STOCK));
static DECREMENT_STOCK_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(scripts::DECREMENT_STOCK));
static RECORD_PURCHASE_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(scripts::RECORD_PURCHASE));
static ATOMIC_PURCHASE_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(scripts::ATOMIC_PURCHASE));

const MAX_CONNECT_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(200);
const BACKOFF_CAP: Duration = Duration::from_secs(2);

pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// Construct the client. Does not connect — the connection is opened
    /// lazily on first call into [`AtomicStore`].
    pub fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| StoreError::Transient(e.to_string()))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        self.conn
            .get_or_try_init(|| connect_with_retry(&self.client))
            .await
            .cloned()
    }
}

async fn connect_with_retry(client: &redis::Client) -> Result<ConnectionManager, StoreError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match client.get_connection_manager().await {
            Ok(conn) => return Ok(conn),
            Err(e) if attempt >= MAX_CONNECT_ATTEMPTS => {
                tracing::error!(
                    "Atomic Store connection failed after {} attempts: {}",
                    attempt,
                    e
                );
                return Err(StoreError::Transient(e.to_string()));
            }
            Err(e) => {
                let backoff = BACKOFF_BASE
                    .saturating_mul(1 << (attempt - 1))
                    .min(BACKOFF_CAP);
                tracing::warn!(
                    "Atomic Store connection attempt {} failed ({}); retrying in {:?}",
                    attempt,
                    e,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Reads the second element of a `{code, value}` script reply as a
/// timestamp string.
fn value_as_string(value: redis::Value) -> Result<String, StoreError> {
    redis::from_redis_value(&value)
        .map_err(|e| StoreError::ProtocolViolation(format!("expected string reply: {e}")))
}

/// Reads the second element of a `{code, value}` script reply as an
/// integer.
fn value_as_int(value: redis::Value) -> Result<i64, StoreError> {
    redis::from_redis_value(&value)
        .map_err(|e| StoreError::ProtocolViolation(format!("expected integer reply: {e}")))
}

#[async_trait::async_trait]
impl AtomicStore for RedisStore {
    async fn init_stock(&self, stock_key: &str, total_stock: i64) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        INIT_STOCK_SCRIPT
            .key(stock_key)
            .arg(total_stock)
            .invoke_async::<()>(&mut conn)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))
    }

    async fn get_stock(&self, stock_key: &str) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<i64> = conn
            .get(stock_key)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?;
        Ok(value.unwrap_or(0))
    }

    async fn decrement_stock(&self, stock_key: &str) -> Result<DecrementOutcome, StoreError> {
        let mut conn = self.connection().await?;
        let (code, value): (i64, redis::Value) = DECREMENT_STOCK_SCRIPT
            .key(stock_key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?;
        match code {
            1 => Ok(DecrementOutcome::Decremented {
                remaining: value_as_int(value)?,
            }),
            0 => match value_as_int(value)? {
                -1 => Ok(DecrementOutcome::Absent),
                _ => Ok(DecrementOutcome::Exhausted),
            },
            other => Err(StoreError::ProtocolViolation(format!(
                "DECREMENT_STOCK returned unknown code {other}"
            ))),
        }
    }

    async fn set_stock(&self, stock_key: &str, value: i64) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(stock_key, value)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))
    }

    async fn has_purchased(
        &self,
        ledger_key: &str,
        user_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        conn.hget(ledger_key, user_id)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))
    }

    async fn record_purchase(
        &self,
        ledger_key: &str,
        user_id: &str,
        now_iso: &str,
    ) -> Result<RecordOutcome, StoreError> {
        let mut conn = self.connection().await?;
        let (code, value): (i64, redis::Value) = RECORD_PURCHASE_SCRIPT
            .key(ledger_key)
            .arg(user_id)
            .arg(now_iso)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?;
        match code {
            1 => Ok(RecordOutcome::Recorded),
            0 => Ok(RecordOutcome::AlreadyPresent {
                purchased_at: value_as_string(value)?,
            }),
            other => Err(StoreError::ProtocolViolation(format!(
                "RECORD_PURCHASE returned unknown code {other}"
            ))),
        }
    }

    async fn get_all_purchases(
        &self,
        ledger_key: &str,
    ) -> Result<Vec<(String, String)>, StoreError> {
        let mut conn = self.connection().await?;
        let map: std::collections::HashMap<String, String> = conn
            .hgetall(ledger_key)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?;
        Ok(map.into_iter().collect())
    }

    async fn get_purchase_count(&self, ledger_key: &str) -> Result<usize, StoreError> {
        let mut conn = self.connection().await?;
        let count: usize = conn
            .hlen(ledger_key)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?;
        Ok(count)
    }

    async fn clear_purchases(&self, ledger_key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(ledger_key)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))
    }

    async fn atomic_purchase(
        &self,
        stock_key: &str,
        ledger_key: &str,
        user_id: &str,
        now_iso: &str,
    ) -> Result<PurchaseScriptResult, StoreError> {
        let mut conn = self.connection().await?;
        let (code, value): (i64, redis::Value) = ATOMIC_PURCHASE_SCRIPT
            .key(stock_key)
            .key(ledger_key)
            .arg(user_id)
            .arg(now_iso)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?;
        match code {
            1 => Ok(PurchaseScriptResult::Success {
                remaining: value_as_int(value)?,
            }),
            0 => Ok(PurchaseScriptResult::AlreadyPurchased {
                purchased_at: value_as_string(value)?,
            }),
            2 => Ok(PurchaseScriptResult::OutOfStock),
            other => Err(StoreError::ProtocolViolation(format!(
                "ATOMIC_PURCHASE returned unknown code {other}"
            ))),
        }
    }
}

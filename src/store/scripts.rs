//! Lua bodies for the Atomic Store's server-side scripting primitive.
//! Each script is compiled once (see [`redis_store::RedisStore`]) and
//! executed as a single indivisible round trip.

/// `initialize()`: set the stock counter iff absent.
pub const INIT_STOCK: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    redis.call('SET', KEYS[1], ARGV[1])
end
return redis.status_reply('OK')
"#;

/// Administrative/test-only decrement. Returns
/// `{1, remaining}` on success, `{0, 0}` if the counter is present but
/// already zero, `{0, -1}` if the counter is absent.
pub const DECREMENT_STOCK: &str = r#"
local v = redis.call('GET', KEYS[1])
if not v then
    return {0, -1}
end
local n = tonumber(v)
if n <= 0 then
    return {0, 0}
end
local remaining = redis.call('DECR', KEYS[1])
return {1, remaining}
"#;

/// Insert-if-absent ledger write (`recordPurchase`). Returns
/// `{1, now_iso}` on success, `{0, existing}` if already present.
pub const RECORD_PURCHASE: &str = r#"
local existing = redis.call('HGET', KEYS[1], ARGV[1])
if existing then
    return {0, existing}
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
return {1, ARGV[2]}
"#;

/// The combined atomic purchase script — the heart of the core.
/// `KEYS[1]` = stock key, `KEYS[2]` = ledger key (hash),
/// `ARGV[1]` = normalized user id, `ARGV[2]` = now (ISO-8601 UTC).
///
/// Returns `{0, existing_timestamp}` (already_purchased),
/// `{2, 0}` (out_of_stock), or `{1, remaining}` (success).
pub const ATOMIC_PURCHASE: &str = r#"
local existing = redis.call('HGET', KEYS[2], ARGV[1])
if existing then
    return {0, existing}
end
local stock = redis.call('GET', KEYS[1])
if (not stock) or tonumber(stock) <= 0 then
    return {2, 0}
end
local remaining = redis.call('DECR', KEYS[1])
redis.call('HSET', KEYS[2], ARGV[1], ARGV[2])
return {1, remaining}
"#;

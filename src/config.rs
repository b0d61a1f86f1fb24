//! Process-wide configuration, loaded once at startup from environment
//! variables. Reloads during a running sale are not supported.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} is not a valid integer: {value:?}")]
    InvalidInt { field: &'static str, value: String },
    #[error("{field} is not a valid ISO-8601 timestamp: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("TOTAL_STOCK must be non-negative, got {0}")]
    NegativeStock(i64),
    #[error("SALE_START_TIME ({start}) is after SALE_END_TIME ({end})")]
    WindowInverted { start: DateTime<Utc>, end: DateTime<Utc> },
}

/// Immutable sale configuration: window bounds, stock, product metadata.
#[derive(Debug, Clone)]
pub struct SaleConfig {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_stock: i64,
    pub product_name: String,
    pub product_price: String,
}

/// Everything the binary needs to boot: sale rules, server bindings, the
/// Atomic Store connection string, and the ambient logging/CORS/rate-limit
/// knobs the HTTP plumbing layer reads.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sale: SaleConfig,
    pub host: String,
    pub port: u16,
    pub redis_url: String,
    pub cors_origin: String,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub admin_routes: bool,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_int(field: &'static str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidInt {
            field,
            value: raw.to_string(),
        })
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidTimestamp {
            field,
            value: raw.to_string(),
        })
}

impl AppConfig {
    /// Load configuration from the process environment. Fails closed:
    /// invalid timestamps, a non-numeric stock count, a negative stock
    /// count, or an inverted window abort the process.
    pub fn load() -> Result<Self, ConfigError> {
        let now = Utc::now();

        let start_time = match std::env::var("SALE_START_TIME") {
            Ok(raw) => parse_timestamp("SALE_START_TIME", &raw)?,
            Err(_) => now + Duration::seconds(60),
        };
        let end_time = match std::env::var("SALE_END_TIME") {
            Ok(raw) => parse_timestamp("SALE_END_TIME", &raw)?,
            Err(_) => now + Duration::hours(1),
        };
        if start_time > end_time {
            return Err(ConfigError::WindowInverted {
                start: start_time,
                end: end_time,
            });
        }
        if std::env::var("SALE_START_TIME").is_err() || std::env::var("SALE_END_TIME").is_err() {
            tracing::warn!(
                "SALE_START_TIME/SALE_END_TIME not both set explicitly; falling back to \
                 now+60s/now+1h. Set both explicitly for any deployment beyond local dev."
            );
        }

        let total_stock = parse_int("TOTAL_STOCK", &env_or("TOTAL_STOCK", "100"))?;
        if total_stock < 0 {
            return Err(ConfigError::NegativeStock(total_stock));
        }

        let port = env_or("PORT", "3001")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidInt {
                field: "PORT",
                value: env_or("PORT", "3001"),
            })?;

        let rate_limit_max = parse_int("RATE_LIMIT_MAX", &env_or("RATE_LIMIT_MAX", "100"))? as u32;
        let rate_limit_window_secs = parse_rate_limit_window(&env_or("RATE_LIMIT_WINDOW", "1 minute"));

        let log_format = match env_or("LOG_FORMAT", "text").as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            sale: SaleConfig {
                start_time,
                end_time,
                total_stock,
                product_name: env_or("PRODUCT_NAME", "Flash Sale Item"),
                product_price: env_or("PRODUCT_PRICE", "0.00"),
            },
            host: env_or("HOST", "0.0.0.0"),
            port,
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            cors_origin: env_or("CORS_ORIGIN", "*"),
            rate_limit_max,
            rate_limit_window_secs,
            admin_routes: env_or("ADMIN_ROUTES", "false") == "true" || env_or("ADMIN_ROUTES", "0") == "1",
            log_level: env_or("LOG_LEVEL", "info"),
            log_format,
        })
    }
}

/// Best-effort parse of a human-readable window like "1 minute" or "30
/// seconds" into seconds. Falls back to 60s on anything unrecognized —
/// just need a sane default for the bundled rate-limit middleware.
fn parse_rate_limit_window(raw: &str) -> u64 {
    let raw = raw.trim().to_lowercase();
    let mut parts = raw.split_whitespace();
    let n: u64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    match parts.next() {
        Some(unit) if unit.starts_with("sec") => n,
        Some(unit) if unit.starts_with("min") => n * 60,
        Some(unit) if unit.starts_with("hour") => n * 3600,
        _ => 60,
    }
}

//! Structured logging setup: an `EnvFilter` derived from configuration
//! (overridable via `RUST_LOG`), a non-blocking stdout layer, and an
//! optional JSON layer for log aggregation.

use crate::config::{AppConfig, LogFormat};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber. Returns a guard that must be
/// held for the lifetime of the process — dropping it flushes the
/// non-blocking writer and stops further log delivery.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(non_blocking)
                .with_ansi(false);
            registry.with(layer).init();
        }
        LogFormat::Text => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(non_blocking)
                .with_ansi(true);
            registry.with(layer).init();
        }
    }

    guard
}

//! # Structured Logging Module
//!
//! Console logging for the booking workflow, pretty or JSON, filtered by
//! `RUST_LOG` when set and by the configured level otherwise.

use crate::config::{LogFormat, LoggingConfig};
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = build_filter(&config.level);

        let layer = match config.format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed(),
        };

        // Another subscriber (an embedding application, a test harness) may already be set.
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
            return;
        }

        tracing::info!(
            pid = std::process::id(),
            level = %config.level,
            format = ?config.format,
            "Structured logging initialized"
        );
    });
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Log structured data for a booking operation
pub fn log_booking_operation(
    operation: &str,
    booking_id: Option<&str>,
    from_state: &str,
    to_state: &str,
    generation: u64,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        booking_id = booking_id,
        from_state = %from_state,
        to_state = %to_state,
        generation = generation,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "BOOKING_OPERATION"
    );
}

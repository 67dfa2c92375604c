//! # Booking Workflow Configuration
//!
//! Layered configuration for the workflow core and its logging.
//!
//! The core recognises a single tunable, the deferred-completion delay. Everything
//! else here configures the ambient logging stack.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use booking_workflow::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let delay = manager.config().workflow.completion_delay();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{DEFAULT_COMPLETION_DELAY_MS, MAX_COMPLETION_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/booking.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Workflow core settings
    pub workflow: WorkflowConfig,

    /// Structured logging settings
    pub logging: LoggingConfig,
}

impl BookingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.workflow.validate()?;
        self.logging.validate()
    }
}

/// Settings for the booking state machine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Time between entering `pending` and the automatic move to `booked`
    pub completion_delay_ms: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            completion_delay_ms: DEFAULT_COMPLETION_DELAY_MS,
        }
    }
}

impl WorkflowConfig {
    /// Configuration for `delay`, rounded up to whole milliseconds
    pub fn with_delay(delay: Duration) -> Self {
        let millis = delay.as_nanos().div_ceil(1_000_000);
        Self {
            completion_delay_ms: u64::try_from(millis).unwrap_or(u64::MAX),
        }
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    /// Lightweight loader reading `BOOKING_COMPLETION_DELAY_MS` over the defaults
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Ok(delay) = std::env::var("BOOKING_COMPLETION_DELAY_MS") {
            config.completion_delay_ms = delay.parse().map_err(|e| {
                ConfigurationError::invalid_value(
                    "BOOKING_COMPLETION_DELAY_MS",
                    delay.clone(),
                    format!("{e}"),
                )
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.completion_delay_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "workflow.completion_delay_ms",
                "0",
                "completion delay must be greater than 0",
            ));
        }

        if self.completion_delay_ms > MAX_COMPLETION_DELAY_MS {
            return Err(ConfigurationError::invalid_value(
                "workflow.completion_delay_ms",
                self.completion_delay_ms.to_string(),
                format!("completion delay must not exceed {MAX_COMPLETION_DELAY_MS}ms"),
            ));
        }

        Ok(())
    }
}

/// Output format of the console log layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.level.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "logging.level",
                "logging configuration",
            ));
        }
        Ok(())
    }
}

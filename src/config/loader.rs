//! Configuration Loader
//!
//! Environment-aware loading: `booking.toml`, then `booking.<environment>.toml`,
//! then `BOOKING__`-prefixed environment variables. Both files are optional.

use super::error::{ConfigResult, ConfigurationError};
use super::BookingConfig;
use config::{Config, Environment, File, FileFormat, Map};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const ENV_PREFIX: &str = "BOOKING";
const ENV_SEPARATOR: &str = "__";

pub struct ConfigManager {
    config: BookingConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_sources(config_dir, environment, None)
    }

    /// Same as [`Self::load_from_directory_with_env`], but reads overrides from
    /// `variables` instead of the process environment
    pub fn load_with_sources(
        config_dir: Option<PathBuf>,
        environment: &str,
        variables: Option<Map<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment, variables)?;
        config.validate()?;

        debug!(
            environment = environment,
            completion_delay_ms = config.workflow.completion_delay_ms,
            log_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn detect_environment() -> String {
        env::var("BOOKING_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
        variables: Option<Map<String, String>>,
    ) -> ConfigResult<BookingConfig> {
        let base = config_directory.join("booking.toml");
        let overlay = config_directory.join(format!("booking.{environment}.toml"));

        let builder = Config::builder()
            .add_source(File::new(&base.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(File::new(&overlay.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(variables),
            );

        builder
            .build()
            .and_then(|built| built.try_deserialize::<BookingConfig>())
            .map_err(|e| ConfigurationError::load_failed(config_directory.display().to_string(), e))
    }
}

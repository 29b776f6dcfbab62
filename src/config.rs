//! # Configuration System
//!
//! Explicit, validated configuration loading for the core. Defaults cover every
//! field so tests and embedded use never depend on ambient files; an optional
//! TOML file and `JOBWATCH_*` environment variables override them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jobwatch_core::config::CoreConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoreConfig::load()?;
//! println!("cache TTL: {}s", config.cache.record_interval_seconds);
//! # Ok(())
//! # }
//! ```

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Record Store connection and pooling configuration
    pub database: DatabaseConfig,

    /// Key-Value Cache expiry configuration
    pub cache: CacheConfig,

    /// Wizard pagination and rendering settings
    pub wizard: WizardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Process-wide default TTL for cached aggregates, in seconds.
    pub record_interval_seconds: u64,

    /// Shorter TTL used for short-lived flags (search-active refresh).
    pub short_record_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Items per page for every paginated listing.
    pub page_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            wizard: WizardConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/jobwatch_development".to_string(),
            pool_size: 10,
            connect_timeout_seconds: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            record_interval_seconds: 3600,
            short_record_interval_seconds: 300,
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self { page_size: 6 }
    }
}

impl CoreConfig {
    /// Load configuration from defaults, an optional `jobwatch.toml`, and
    /// `JOBWATCH_*` environment variables (double underscore separates
    /// nesting, e.g. `JOBWATCH_CACHE__RECORD_INTERVAL_SECONDS`).
    pub fn load() -> Result<Self> {
        Self::load_from(std::env::var("JOBWATCH_CONFIG").ok().as_deref())
    }

    /// Load configuration with an explicit config file path.
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("jobwatch").required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("JOBWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CoreError::Configuration(e.to_string()))?;

        let config: CoreConfig = settings
            .try_deserialize()
            .map_err(|e| CoreError::Configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.wizard.page_size == 0 {
            return Err(CoreError::Configuration(
                "wizard.page_size must be at least 1".to_string(),
            ));
        }
        if self.cache.record_interval_seconds == 0 {
            return Err(CoreError::Configuration(
                "cache.record_interval_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl CacheConfig {
    pub fn record_interval(&self) -> Duration {
        Duration::from_secs(self.record_interval_seconds)
    }

    pub fn short_record_interval(&self) -> Duration {
        Duration::from_secs(self.short_record_interval_seconds)
    }
}
